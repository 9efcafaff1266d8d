//! Scanner for real number literals in bases 2 to 62.
//!
//! Accepts the longest valid prefix of the input and reports how many bytes
//! it used, so callers can continue after it:
//!
//! ```text
//! [+|-] ( @nan@ | @inf@ | nan | inf | infinity | [0x|0b] digits [. digits] [exponent] )
//! exponent = ( e | E | @ | p | P ) [+|-] decimal-digits
//! ```
//!
//! `nan`/`inf`/`infinity` (any case) are only recognized for bases up to 16,
//! where they cannot be confused with digits. `e`/`E` marks a power of the base
//! for bases up to 10, `@` does so for every base, and `p`/`P` marks a power of
//! two in bases 2 and 16. For bases up to 36 letters are case-insensitive
//! digits; above 36, `A-Z` are 10 to 35 and `a-z` are 36 to 61.

use std::cmp::Ordering;

use dashu::integer::UBig;

use crate::bigfloat::{BigFloat, ScaledInteger};
use crate::round::RoundingMode;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LiteralValue {
    Nan,
    Infinity,
    Number {
        mantissa: UBig,
        /// Digits after the radix point.
        fraction_digits: usize,
        exponent: i64,
        /// `exponent` is a power of two rather than of the base.
        binary_exponent: bool,
    },
}

/// A scanned literal: its sign, value and length in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Literal {
    pub negative: bool,
    pub value: LiteralValue,
    pub len: usize,
}

pub(crate) fn digit_value(byte: u8, base: u32) -> Option<u32> {
    let value = match byte {
        b'0'..=b'9' => (byte - b'0') as u32,
        b'A'..=b'Z' => (byte - b'A') as u32 + 10,
        b'a'..=b'z' if base <= 36 => (byte - b'a') as u32 + 10,
        b'a'..=b'z' => (byte - b'a') as u32 + 36,
        _ => return None,
    };
    (value < base).then_some(value)
}

fn starts_with_ignore_case(bytes: &[u8], word: &[u8]) -> bool {
    bytes.len() >= word.len() && bytes[..word.len()].eq_ignore_ascii_case(word)
}

/// Length of a `nan(...)` payload suffix, or 0 if none.
fn nan_payload_len(bytes: &[u8]) -> usize {
    if bytes.first() != Some(&b'(') {
        return 0;
    }
    let inner = bytes[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if bytes.get(1 + inner) == Some(&b')') {
        inner + 2
    } else {
        0
    }
}

/// Scan a decimal exponent after its marker. Returns the value (saturated)
/// and the bytes used, including the marker.
fn scan_exponent(bytes: &[u8]) -> Option<(i64, usize)> {
    let mut pos = 1;
    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };
    let start = pos;
    let mut value: i64 = 0;
    while let Some(byte) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
        value = value
            .saturating_mul(10)
            .saturating_add((byte - b'0') as i64);
        pos += 1;
    }
    if pos == start {
        return None;
    }
    Some((if negative { -value } else { value }, pos))
}

/// Scan the longest real literal at the start of `bytes`.
pub(crate) fn scan(bytes: &[u8], base: u32) -> Option<Literal> {
    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };
    let rest = &bytes[pos..];

    if starts_with_ignore_case(rest, b"@nan@") {
        return Some(Literal {
            negative,
            value: LiteralValue::Nan,
            len: pos + 5,
        });
    }
    if starts_with_ignore_case(rest, b"@inf@") {
        return Some(Literal {
            negative,
            value: LiteralValue::Infinity,
            len: pos + 5,
        });
    }
    if base <= 16 {
        if starts_with_ignore_case(rest, b"nan") {
            let len = pos + 3 + nan_payload_len(&rest[3..]);
            return Some(Literal {
                negative,
                value: LiteralValue::Nan,
                len,
            });
        }
        if starts_with_ignore_case(rest, b"infinity") {
            return Some(Literal {
                negative,
                value: LiteralValue::Infinity,
                len: pos + 8,
            });
        }
        if starts_with_ignore_case(rest, b"inf") {
            return Some(Literal {
                negative,
                value: LiteralValue::Infinity,
                len: pos + 3,
            });
        }
    }

    // A radix prefix only counts when digits follow it.
    let prefix: &[u8] = match base {
        16 => b"0x",
        2 => b"0b",
        _ => b"",
    };
    if !prefix.is_empty() && starts_with_ignore_case(rest, prefix) {
        let after = &rest[prefix.len()..];
        let digit_follows = after.first().and_then(|b| digit_value(*b, base)).is_some()
            || (after.first() == Some(&b'.')
                && after.get(1).and_then(|b| digit_value(*b, base)).is_some());
        if digit_follows {
            pos += prefix.len();
        }
    }

    let big_base = UBig::from(base);
    let mut mantissa = UBig::ZERO;
    let mut digits = 0usize;
    let mut fraction_digits = 0usize;
    let mut seen_point = false;
    while let Some(&byte) = bytes.get(pos) {
        if byte == b'.' && !seen_point {
            seen_point = true;
            pos += 1;
            continue;
        }
        match digit_value(byte, base) {
            Some(d) => {
                mantissa = mantissa * &big_base + UBig::from(d);
                digits += 1;
                if seen_point {
                    fraction_digits += 1;
                }
                pos += 1;
            }
            None => break,
        }
    }
    if digits == 0 {
        return None;
    }
    // A trailing point with no fraction digits still belongs to the literal.

    let mut exponent = 0i64;
    let mut binary_exponent = false;
    if let Some(&marker) = bytes.get(pos) {
        let power_of_base = marker == b'@' || (base <= 10 && (marker == b'e' || marker == b'E'));
        let power_of_two = (base == 2 || base == 16) && (marker == b'p' || marker == b'P');
        if power_of_base || power_of_two {
            if let Some((value, used)) = scan_exponent(&bytes[pos..]) {
                exponent = value;
                binary_exponent = power_of_two;
                pos += used;
            }
        }
    }

    Some(Literal {
        negative,
        value: LiteralValue::Number {
            mantissa,
            fraction_digits,
            exponent,
            binary_exponent,
        },
        len: pos,
    })
}

impl Literal {
    /// Correctly rounded value of the literal. Magnitudes certainly outside
    /// `[emin, emax]` are not expanded, see [`ScaledInteger::round`].
    pub(crate) fn round(
        &self,
        base: u32,
        precision_bits: usize,
        round: RoundingMode,
        emin: isize,
        emax: isize,
    ) -> (BigFloat, Ordering) {
        let (mantissa, fraction_digits, exponent, binary_exponent) = match &self.value {
            LiteralValue::Nan => return (BigFloat::nan(precision_bits), Ordering::Equal),
            LiteralValue::Infinity => {
                return (
                    BigFloat::infinity(self.negative, precision_bits),
                    Ordering::Equal,
                )
            }
            LiteralValue::Number {
                mantissa,
                fraction_digits,
                exponent,
                binary_exponent,
            } => (mantissa, *fraction_digits, *exponent, *binary_exponent),
        };

        let (base_power, two_power) = if binary_exponent {
            (-(fraction_digits as i64), exponent)
        } else {
            (exponent.saturating_sub(fraction_digits as i64), 0)
        };
        ScaledInteger {
            negative: self.negative,
            mantissa,
            base,
            base_power,
            two_power,
        }
        .round(precision_bits, round, emin, emax)
    }
}
