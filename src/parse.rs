//! Measurement decoders.
//!
//! Three ways of turning the text after the `;` into a number, from most
//! general to most specialised:
//!
//! - [`GeneralDecoder`] hands the text to the standard library float parser.
//! - [`CustomDecoder`] accumulates the digits into an integer mantissa and
//!   scales it by a power of ten derived from the decimal point position.
//! - [`FixedDecoder`] only accepts exactly one fractional digit and returns
//!   the value multiplied by ten as an integer, so accumulation never touches
//!   floating point.
//!
//! Each decoder names the value type it produces, and that type carries the
//! arithmetic the aggregation table uses, so a run can never parse with one
//! representation and accumulate with another.

use std::{fmt, ops::AddAssign};

use memchr::memchr;

use crate::{Result, StatsError};

/// Largest number of significant digits [`CustomDecoder`] accepts.
/// Nineteen nines still fit in a `u64` mantissa.
pub const MAX_SIGNIFICANT_DIGITS: usize = 19;

/// Largest number of integer digits [`FixedDecoder`] accepts. The scaled value
/// stays below 10^17, so even `u64::MAX` observations sum well inside the
/// `i128` total that [`Tenths`] accumulates into.
pub const MAX_FIXED_DIGITS: usize = 16;

/// Powers of ten that are exactly representable as `f64`.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Arithmetic the aggregation table needs from a decoded value.
pub trait Measurement: Copy + PartialOrd {
    /// Running sum of values. May be wider than the value itself.
    type Total: Copy + AddAssign + PartialEq + fmt::Debug;

    fn to_total(self) -> Self::Total;

    /// The value in measurement units.
    fn to_f64(self) -> f64;

    /// Mean of `count` observations summing to `total`, in measurement units.
    fn mean(total: Self::Total, count: u64) -> f64;
}

impl Measurement for f64 {
    type Total = f64;

    #[inline]
    fn to_total(self) -> f64 {
        self
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn mean(total: f64, count: u64) -> f64 {
        total / count as f64
    }
}

/// A measurement held as an integer count of tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tenths(pub i64);

impl Measurement for Tenths {
    type Total = i128;

    #[inline]
    fn to_total(self) -> i128 {
        self.0 as i128
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self.0 as f64 / 10.0
    }

    #[inline]
    fn mean(total: i128, count: u64) -> f64 {
        total as f64 / count as f64 / 10.0
    }
}

/// A measurement decoding strategy.
///
/// Decoders are stateless types; the driver is generic over them so the
/// choice is made once per run rather than once per line.
pub trait Decoder {
    type Value: Measurement;

    fn decode(text: &[u8]) -> Result<Self::Value>;
}

/// Delegates to the standard library float parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralDecoder;

/// Hand-rolled mantissa/exponent reconstruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomDecoder;

/// One fractional digit, decoded straight into [`Tenths`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDecoder;

impl Decoder for GeneralDecoder {
    type Value = f64;

    #[inline]
    fn decode(text: &[u8]) -> Result<f64> {
        parse_general(text)
    }
}

impl Decoder for CustomDecoder {
    type Value = f64;

    #[inline]
    fn decode(text: &[u8]) -> Result<f64> {
        parse_custom(text)
    }
}

impl Decoder for FixedDecoder {
    type Value = Tenths;

    #[inline]
    fn decode(text: &[u8]) -> Result<Tenths> {
        parse_fixed(text).map(Tenths)
    }
}

pub fn parse_general(text: &[u8]) -> Result<f64> {
    let value: f64 = std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StatsError::malformed(text))?;
    // the std parser also accepts "inf" and "NaN", which are never measurements
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StatsError::malformed(text))
    }
}

/// Decoded pieces of a decimal number: `value = mantissa / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decimal {
    mantissa: u64,
    scale: u32,
    negative: bool,
}

fn read_decimal(text: &[u8]) -> Option<Decimal> {
    let (negative, digits) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, text),
    };
    let mut mantissa = 0u64;
    let mut significant = 0usize;
    let mut scale = 0u32;
    let mut saw_dot = false;
    let mut saw_digits = false;
    for &c in digits {
        match c {
            b'.' if !saw_dot => saw_dot = true,
            b'0'..=b'9' => {
                saw_digits = true;
                if saw_dot {
                    scale += 1;
                }
                // leading zeros only shift the scale
                if c == b'0' && significant == 0 {
                    continue;
                }
                if significant == MAX_SIGNIFICANT_DIGITS {
                    return None;
                }
                mantissa = mantissa * 10 + (c - b'0') as u64;
                significant += 1;
            }
            _ => return None,
        }
    }
    saw_digits.then_some(Decimal {
        mantissa,
        scale,
        negative,
    })
}

pub fn parse_custom(text: &[u8]) -> Result<f64> {
    let Decimal {
        mantissa,
        scale,
        negative,
    } = read_decimal(text).ok_or_else(|| StatsError::malformed(text))?;
    let divisor = match POW10.get(scale as usize) {
        Some(p) => *p,
        None => 10f64.powi(scale as i32),
    };
    let value = mantissa as f64 / divisor;
    if negative { Ok(-value) } else { Ok(value) }
}

/// Parses `[+-]digits.d` into the value times ten.
///
/// Anything other than exactly one fractional digit is rejected: scaling by a
/// fixed factor of ten would silently misread `1.25` as `12` or `12` as `1.2`.
pub fn parse_fixed(text: &[u8]) -> Result<i64> {
    let (negative, first) = match text.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let dot = memchr(b'.', text).ok_or_else(|| StatsError::malformed(text))?;
    let whole = dot
        .checked_sub(first)
        .filter(|&n| (1..=MAX_FIXED_DIGITS).contains(&n));
    if whole.is_none() || text.len() != dot + 2 {
        return Err(StatsError::malformed(text));
    }
    let tenths = text[dot + 1];
    if !tenths.is_ascii_digit() {
        return Err(StatsError::malformed(text));
    }
    let mut n = (tenths - b'0') as i64;
    let mut exp = 10i64;
    // right to left through the whole part
    for &c in text[first..dot].iter().rev() {
        if !c.is_ascii_digit() {
            return Err(StatsError::malformed(text));
        }
        n += (c - b'0') as i64 * exp;
        exp *= 10;
    }
    if negative { Ok(-n) } else { Ok(n) }
}
