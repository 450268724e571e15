//! Storage size units and downscale conversion
//!
//! The simulator speaks in whole units on a fixed 1024 ladder. Conversion is
//! deliberately one-directional: geometry and write sizes only ever need to be
//! expressed in a smaller unit (ultimately bytes), so scaling up has no
//! meaning here and reports the sentinel `0` instead.

use crate::error::{LogdiskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier between two adjacent units on the ladder.
pub const UNIT_STEP: u64 = 1024;

/// Size unit ladder, ordered smallest to largest.
///
/// The derived `Ord` follows declaration order, so `SizeUnit::B` is the
/// minimum and comparisons like `from < to` mean "scaling up".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    /// Position on the ladder: 0 for bytes, 4 for terabytes.
    const fn rank(self) -> u32 {
        match self {
            SizeUnit::B => 0,
            SizeUnit::KB => 1,
            SizeUnit::MB => 2,
            SizeUnit::GB => 3,
            SizeUnit::TB => 4,
        }
    }

    /// Parse an exact unit token. Case-sensitive: the command grammar only
    /// ever produces upper-case unit suffixes.
    pub fn parse(token: &str) -> Option<SizeUnit> {
        match token {
            "B" => Some(SizeUnit::B),
            "KB" => Some(SizeUnit::KB),
            "MB" => Some(SizeUnit::MB),
            "GB" => Some(SizeUnit::GB),
            "TB" => Some(SizeUnit::TB),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeUnit {
    type Err = LogdiskError;

    fn from_str(s: &str) -> Result<Self> {
        SizeUnit::parse(s).ok_or_else(|| LogdiskError::BadUnit {
            unit: s.to_string(),
            command: "size",
        })
    }
}

/// Convert `quantity` from one unit into a smaller (or equal) unit.
///
/// Each step down the ladder multiplies by 1024. Scaling up is not supported
/// and yields `Ok(0)`; callers own the direction and must treat `0` from a
/// nonzero quantity as "conversion not available", never as a size.
///
/// Multiplication is checked: a quantity whose converted value does not fit
/// in `u64` is a `BadQuantity` error, the same verdict the parser hands a
/// digit string that overflows on its own. The widest conversion, TB to B,
/// multiplies by 2^40, so the bound bites from 2^24 TB upward.
///
/// # Examples
///
/// ```
/// use logdisk::units::{convert, SizeUnit};
///
/// assert_eq!(convert(4, SizeUnit::MB, SizeUnit::KB).unwrap(), 4096);
/// assert_eq!(convert(4, SizeUnit::MB, SizeUnit::MB).unwrap(), 4);
/// assert_eq!(convert(4, SizeUnit::KB, SizeUnit::MB).unwrap(), 0); // upscale: sentinel
/// assert!(convert(u64::MAX, SizeUnit::GB, SizeUnit::B).is_err());
/// ```
pub fn convert(quantity: u64, from: SizeUnit, to: SizeUnit) -> Result<u64> {
    if from < to {
        tracing::debug!(%from, %to, "upscale conversion requested, reporting sentinel");
        return Ok(0);
    }
    quantity
        .checked_mul(UNIT_STEP.pow(from.rank() - to.rank()))
        .ok_or_else(|| LogdiskError::BadQuantity(format!("{quantity}{from}")))
}

/// Shortcut for the common "everything in bytes" direction.
pub fn to_bytes(quantity: u64, unit: SizeUnit) -> Result<u64> {
    convert(quantity, unit, SizeUnit::B)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_order() {
        assert!(SizeUnit::B < SizeUnit::KB);
        assert!(SizeUnit::KB < SizeUnit::MB);
        assert!(SizeUnit::MB < SizeUnit::GB);
        assert!(SizeUnit::GB < SizeUnit::TB);
    }

    #[test]
    fn test_downscale_steps() {
        assert_eq!(convert(1, SizeUnit::KB, SizeUnit::B).unwrap(), 1024);
        assert_eq!(convert(1, SizeUnit::MB, SizeUnit::B).unwrap(), 1024 * 1024);
        assert_eq!(convert(1, SizeUnit::GB, SizeUnit::MB).unwrap(), 1024);
        assert_eq!(convert(3, SizeUnit::TB, SizeUnit::GB).unwrap(), 3 * 1024);
        assert_eq!(convert(2, SizeUnit::TB, SizeUnit::B).unwrap(), 2 << 40);
    }

    #[test]
    fn test_identity_conversion() {
        assert_eq!(convert(7, SizeUnit::B, SizeUnit::B).unwrap(), 7);
        assert_eq!(convert(7, SizeUnit::TB, SizeUnit::TB).unwrap(), 7);
        assert_eq!(convert(0, SizeUnit::MB, SizeUnit::B).unwrap(), 0);
    }

    #[test]
    fn test_upscale_sentinel() {
        assert_eq!(convert(1024, SizeUnit::B, SizeUnit::KB).unwrap(), 0);
        assert_eq!(convert(1, SizeUnit::MB, SizeUnit::TB).unwrap(), 0);
        assert_eq!(convert(u64::MAX, SizeUnit::GB, SizeUnit::TB).unwrap(), 0);
    }

    #[test]
    fn test_widest_conversion_fits() {
        // Largest power-of-two TB quantity whose byte count still fits u64,
        // then the exact top of the representable range.
        assert_eq!(
            convert(1 << 23, SizeUnit::TB, SizeUnit::B).unwrap(),
            1u64 << 63
        );
        assert_eq!(
            convert((1 << 24) - 1, SizeUnit::TB, SizeUnit::B).unwrap(),
            ((1u64 << 24) - 1) << 40
        );
    }

    #[test]
    fn test_overflowing_conversion_is_rejected() {
        assert!(matches!(
            convert(1 << 24, SizeUnit::TB, SizeUnit::B),
            Err(LogdiskError::BadQuantity(_))
        ));
        assert!(matches!(
            to_bytes(u64::MAX, SizeUnit::GB),
            Err(LogdiskError::BadQuantity(_))
        ));
        // One step below the failing conversion still fits.
        assert!(to_bytes(u64::MAX, SizeUnit::B).is_ok());
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(SizeUnit::parse("B"), Some(SizeUnit::B));
        assert_eq!(SizeUnit::parse("KB"), Some(SizeUnit::KB));
        assert_eq!(SizeUnit::parse("MB"), Some(SizeUnit::MB));
        assert_eq!(SizeUnit::parse("GB"), Some(SizeUnit::GB));
        assert_eq!(SizeUnit::parse("TB"), Some(SizeUnit::TB));
        assert_eq!(SizeUnit::parse("kb"), None);
        assert_eq!(SizeUnit::parse("PB"), None);
        assert_eq!(SizeUnit::parse(""), None);
    }

    #[test]
    fn test_display_round_trip() {
        for unit in [
            SizeUnit::B,
            SizeUnit::KB,
            SizeUnit::MB,
            SizeUnit::GB,
            SizeUnit::TB,
        ] {
            assert_eq!(SizeUnit::parse(unit.as_str()), Some(unit));
        }
    }
}
