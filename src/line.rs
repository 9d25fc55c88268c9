use memchr::memchr;

use crate::{Result, StatsError};

pub const SEPARATOR: u8 = b';';

/// Splits a line at its first `;` into station name and measurement text.
/// Both halves borrow from `line`.
#[inline]
pub fn split_line(line: &[u8]) -> Result<(&[u8], &[u8])> {
    match memchr(SEPARATOR, line) {
        Some(pos) => Ok((&line[..pos], &line[pos + 1..])),
        None => Err(StatsError::invalid_line(line)),
    }
}

/// Strips the line terminator `read_until` leaves in the buffer.
#[inline]
pub fn trim_line_end(mut line: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}
