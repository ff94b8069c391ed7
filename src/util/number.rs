//! Byte sizes and small numeric helpers.

use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumberError {
    #[error("invalid byte size: {0:?}")]
    InvalidSize(String),
}

/// Unit family for [`format_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BytePrefix {
    /// Powers of 1024: KiB, MiB, ...
    #[default]
    Binary,
    /// Powers of 1000: kB, MB, ...
    Decimal,
}

impl BytePrefix {
    fn base(self) -> f64 {
        match self {
            BytePrefix::Binary => 1024.0,
            BytePrefix::Decimal => 1000.0,
        }
    }

    fn units(self) -> [&'static str; 7] {
        match self {
            BytePrefix::Binary => ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"],
            BytePrefix::Decimal => ["B", "kB", "MB", "GB", "TB", "PB", "EB"],
        }
    }
}

/// Human-readable byte count: `1536` → `1.50 KiB` or `1.54 kB`.
///
/// Plain byte counts below one unit are printed without decimals.
pub fn format_bytes(bytes: u64, prefix: BytePrefix, precision: usize) -> String {
    let units = prefix.units();
    let base = prefix.base();
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= base && unit < units.len() - 1 {
        value /= base;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", units[0])
    } else {
        format!("{value:.precision$} {}", units[unit])
    }
}

/// Parse ini-style size shorthand: `512`, `64k`, `8M`, `1G`.
///
/// Multiples are binary. An optional trailing `B` is accepted (`8MB`).
pub fn parse_bytes(input: &str) -> Result<u64, NumberError> {
    let invalid = || NumberError::InvalidSize(input.to_string());
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_suffix(['b', 'B'])
        .filter(|rest| rest.ends_with(|c: char| c.is_ascii_alphabetic()))
        .unwrap_or(trimmed);
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let number: u64 = digits.parse().map_err(|_| invalid())?;
    let shift = match suffix.trim().to_ascii_lowercase().as_str() {
        "" => 0,
        "k" => 10,
        "m" => 20,
        "g" => 30,
        "t" => 40,
        _ => return Err(invalid()),
    };
    number.checked_mul(1u64 << shift).ok_or_else(invalid)
}

/// Clamp `value` into `[min, max]`. Bounds given the wrong way round are
/// swapped rather than panicking.
pub fn clamp_int(value: i64, min: i64, max: i64) -> i64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    value.clamp(lo, hi)
}

/// Compare floats, treating values within `epsilon` as equal.
pub fn compare(a: f64, b: f64, epsilon: f64) -> Ordering {
    if (a - b).abs() <= epsilon {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_binary_and_decimal() {
        assert_eq!(format_bytes(1536, BytePrefix::Binary, 2), "1.50 KiB");
        assert_eq!(format_bytes(1536, BytePrefix::Decimal, 2), "1.54 kB");
        assert_eq!(format_bytes(5 * 1024 * 1024, BytePrefix::Binary, 1), "5.0 MiB");
    }

    #[test]
    fn small_counts_have_no_decimals() {
        assert_eq!(format_bytes(0, BytePrefix::Binary, 2), "0 B");
        assert_eq!(format_bytes(999, BytePrefix::Decimal, 2), "999 B");
    }

    #[test]
    fn huge_counts_stop_at_largest_unit() {
        assert_eq!(format_bytes(u64::MAX, BytePrefix::Binary, 0), "16 EiB");
    }

    #[test]
    fn parses_shorthand() {
        assert_eq!(parse_bytes("512").unwrap(), 512);
        assert_eq!(parse_bytes("64k").unwrap(), 64 * 1024);
        assert_eq!(parse_bytes("8M").unwrap(), 8 * 1024 * 1024);
        assert_eq!(parse_bytes(" 1G ").unwrap(), 1 << 30);
        assert_eq!(parse_bytes("8MB").unwrap(), 8 * 1024 * 1024);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "M", "eight", "8X", "1.5M", "-3"] {
            assert!(parse_bytes(bad).is_err(), "{bad:?} should fail");
        }
        assert!(parse_bytes("99999999999999999999").is_err());
        assert!(parse_bytes("99999999999T").is_err());
    }

    #[test]
    fn clamps() {
        assert_eq!(clamp_int(150, 0, 100), 100);
        assert_eq!(clamp_int(-5, 0, 100), 0);
        assert_eq!(clamp_int(42, 100, 0), 42);
    }

    #[test]
    fn compares_with_tolerance() {
        assert_eq!(compare(100.0, 100.0000001, 1e-6), Ordering::Equal);
        assert_eq!(compare(99.0, 100.0, 1e-6), Ordering::Less);
        assert_eq!(compare(33.4 * 3.0, 100.0, 1e-6), Ordering::Greater);
    }
}
