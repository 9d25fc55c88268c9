//! # brc-stats
//!
//! Per-station minimum, maximum and mean over `station;measurement` lines,
//! computed in a single pass.
//!
//! ```rust
//! use brc_stats::{Strategy, run};
//!
//! let mut out = Vec::new();
//! run(Strategy::Fixed, &mut "A;10.0\nB;20.0\nA;30.0\n".as_bytes(), &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("A\n\tmin: 10.000000\n"));
//! ```
//!
//! The strategies differ only in how the measurement text is decoded and how
//! the table is updated; they all produce the same report.

#![warn(clippy::all)]

pub mod config;
pub mod driver;
mod error;
pub mod line;
pub mod parse;
pub mod summary;

pub use config::{Command, Config, Input, Strategy};
pub use driver::{RunStats, aggregate, run, run_input};
pub use error::StatsError;
pub use parse::{CustomDecoder, Decoder, FixedDecoder, GeneralDecoder, Measurement, Tenths};
pub use summary::{Stat, StationSummary, StationTable};

pub type Result<T> = std::result::Result<T, StatsError>;
