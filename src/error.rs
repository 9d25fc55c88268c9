//! Error types for a measurement aggregation run.

use thiserror::Error;

/// Every condition that aborts a run. None of them are recovered locally.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A line has no `;` between station name and measurement.
    #[error("invalid line: {0}")]
    InvalidLine(String),

    /// A measurement has no digits, or breaks the active decoder's format.
    #[error("invalid measurement: {0}")]
    MalformedNumber(String),

    /// The input source failed for a reason other than end of stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The command line could not be turned into a run configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl StatsError {
    pub(crate) fn invalid_line(line: &[u8]) -> Self {
        StatsError::InvalidLine(String::from_utf8_lossy(line).into_owned())
    }

    pub(crate) fn malformed(text: &[u8]) -> Self {
        StatsError::MalformedNumber(String::from_utf8_lossy(text).into_owned())
    }
}
