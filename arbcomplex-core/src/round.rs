//! Rounding modes and ternary result codes.
//!
//! A ternary code records how an assignment related to the exact value:
//! `Ordering::Less` means the stored value is below the exact one (rounded
//! down), `Greater` means it is above (rounded up), `Equal` means exact.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Ternary codes for the real and imaginary component, in that order.
pub type Ordering2 = (Ordering, Ordering);

/// Rounding modes for the real and imaginary component, in that order.
pub type Round2 = (RoundingMode, RoundingMode);

/// Direction used when a value cannot be represented exactly.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round to nearest, ties to even.
    #[default]
    Nearest,
    /// Round towards zero (truncate).
    TowardZero,
    /// Round towards +∞.
    Up,
    /// Round towards -∞.
    Down,
    /// Round away from zero.
    AwayFromZero,
}

impl RoundingMode {
    /// Whether rounding a magnitude that is too large to represent lands on
    /// infinity rather than on the largest finite value.
    pub(crate) fn overflows_to_infinity(self, negative: bool) -> bool {
        match self {
            RoundingMode::Nearest | RoundingMode::AwayFromZero => true,
            RoundingMode::TowardZero => false,
            RoundingMode::Up => !negative,
            RoundingMode::Down => negative,
        }
    }

    /// Whether a magnitude too small to represent lands on the smallest
    /// non-zero magnitude rather than on zero. Round-to-nearest is resolved
    /// separately because it depends on the magnitude.
    pub(crate) fn underflows_away_from_zero(self, negative: bool) -> bool {
        match self {
            RoundingMode::Nearest | RoundingMode::TowardZero => false,
            RoundingMode::AwayFromZero => true,
            RoundingMode::Up => !negative,
            RoundingMode::Down => negative,
        }
    }
}

/// The ternary code of a value whose magnitude moved towards (`shrunk`) or
/// away from zero.
pub(crate) fn ternary_for_magnitude(negative: bool, shrunk: bool) -> Ordering {
    match (negative, shrunk) {
        (false, true) | (true, false) => Ordering::Less,
        (false, false) | (true, true) => Ordering::Greater,
    }
}

/// Numeric form of one ternary code: 0 exact, 1 rounded up, 2 rounded down.
fn inex_code(ord: Ordering) -> u8 {
    match ord {
        Ordering::Equal => 0,
        Ordering::Greater => 1,
        Ordering::Less => 2,
    }
}

fn inex_from_code(code: u8) -> Ordering {
    match code & 0b11 {
        1 => Ordering::Greater,
        2 => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Pack a pair of ternary codes into a single result code.
///
/// The real code occupies the low two bits and the imaginary code the next
/// two, so a packed value of zero means both components are exact.
pub fn pack_inex(rc: Ordering2) -> u8 {
    inex_code(rc.0) | (inex_code(rc.1) << 2)
}

/// Inverse of [`pack_inex`].
pub fn unpack_inex(code: u8) -> Ordering2 {
    (inex_from_code(code), inex_from_code(code >> 2))
}
