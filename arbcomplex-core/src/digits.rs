//! Digit strings of regular values in bases 2 to 62.
//!
//! A value `x` is written as a signed digit string `D` and an exponent `E`
//! with `x ≈ 0.D × base^E` and a non-zero leading digit.

use dashu::integer::UBig;
use dashu_base::BitTest;

use crate::bigfloat::BigFloat;
use crate::round::RoundingMode;

const DIGITS_62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Number of digits needed so that reading the digits back at the same
/// precision recovers the value exactly: `1 + ceil(p × log_base(2))`.
pub fn round_trip_digits(precision_bits: usize, base: u32) -> usize {
    let digits_per_bit = 1.0 / libm::log2(base as f64);
    1 + libm::ceil(precision_bits as f64 * digits_per_bit) as usize
}

/// `numerator / denominator` rounded to an integer.
fn round_quotient(
    negative: bool,
    numerator: &UBig,
    denominator: &UBig,
    round: RoundingMode,
) -> UBig {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder == UBig::ZERO {
        return quotient;
    }
    let increment = match round {
        RoundingMode::Nearest => {
            let twice = remainder << 1usize;
            if twice == *denominator {
                (quotient.clone() & UBig::ONE) == UBig::ONE
            } else {
                twice > *denominator
            }
        }
        RoundingMode::TowardZero => false,
        RoundingMode::AwayFromZero => true,
        RoundingMode::Up => !negative,
        RoundingMode::Down => negative,
    };
    if increment {
        quotient + UBig::ONE
    } else {
        quotient
    }
}

fn radix_string(mut value: UBig, base: u32) -> String {
    if base <= 36 {
        return value.in_radix(base).to_string();
    }
    let big_base = UBig::from(base);
    let mut out = Vec::new();
    while value != UBig::ZERO {
        let digit = &value % &big_base;
        let index = u8::try_from(digit).map_or(0, usize::from);
        out.push(DIGITS_62[index]);
        value = value / &big_base;
    }
    if out.is_empty() {
        out.push(b'0');
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// `numerator × 2^shift / denominator` rounded to an integer.
fn round_shifted(
    negative: bool,
    numerator: UBig,
    shift: isize,
    denominator: UBig,
    round: RoundingMode,
) -> UBig {
    if shift >= 0 {
        let numerator = numerator << shift as usize;
        round_quotient(negative, &numerator, &denominator, round)
    } else {
        let denominator = denominator << (-shift) as usize;
        round_quotient(negative, &numerator, &denominator, round)
    }
}

/// Keep the top `bits` bits of `value`, adding the dropped count to `exponent`.
fn truncate(value: UBig, exponent: &mut usize, bits: usize) -> UBig {
    let len = value.bit_len();
    if len <= bits {
        return value;
    }
    *exponent += len - bits;
    value >> (len - bits)
}

/// Lower bound `p × 2^t` of `base^power` with `p < 2^bits`.
///
/// Also returns `err`, the number of truncations, so that
/// `base^power <= p × 2^t × (1 + 2^(1-bits))^err`.
fn truncated_power(base: u32, power: usize, bits: usize) -> (UBig, usize, u64) {
    let big_base = UBig::from(base);
    let mut acc = UBig::ONE;
    let mut exponent = 0usize;
    let mut err = 0u64;
    for i in (0..usize::BITS - power.leading_zeros()).rev() {
        exponent *= 2;
        acc = truncate(&acc * &acc, &mut exponent, bits);
        err = 2 * err + 1;
        if (power >> i) & 1 == 1 {
            acc = truncate(acc * &big_base, &mut exponent, bits);
            err += 1;
        }
    }
    (acc, exponent, err)
}

/// `magnitude × 2^exp2 × base^scale` rounded to an integer of about `digits`
/// places in `base`.
///
/// The work depends on the digit count and the size of `magnitude`, not on
/// how far the value is from one: a power of two base only shifts, and a
/// large power of any other base is approximated with enough bits to decide
/// the rounding. Such a product is never a rounding boundary, which a power
/// of an odd factor could only reach for small `scale`.
fn scaled_round(
    negative: bool,
    magnitude: &UBig,
    exp2: isize,
    base: u32,
    scale: isize,
    digits: usize,
    round: RoundingMode,
) -> UBig {
    if base.is_power_of_two() {
        let shift = exp2 + scale * base.trailing_zeros() as isize;
        return round_shifted(negative, magnitude.clone(), shift, UBig::ONE, round);
    }

    let big_base = UBig::from(base);
    let power = scale.unsigned_abs();
    if power <= 4 * digits + magnitude.bit_len() + 64 {
        let power = big_base.pow(power);
        return if scale >= 0 {
            round_shifted(negative, magnitude * power, exp2, UBig::ONE, round)
        } else {
            round_shifted(negative, magnitude.clone(), exp2, power, round)
        };
    }

    let digit_bits = libm::ceil(libm::log2(base as f64) * digits as f64) as usize;
    let mut bits = digit_bits + 2 * (usize::BITS - power.leading_zeros()) as usize + 64;
    loop {
        let (low, t, err) = truncated_power(base, power, bits);
        let high = &low + UBig::from(4 * err + 1);
        let t = t as isize;
        let (from_low, from_high) = if scale >= 0 {
            (
                round_shifted(negative, magnitude * &low, exp2 + t, UBig::ONE, round),
                round_shifted(negative, magnitude * &high, exp2 + t, UBig::ONE, round),
            )
        } else {
            (
                round_shifted(negative, magnitude.clone(), exp2 - t, high, round),
                round_shifted(negative, magnitude.clone(), exp2 - t, low, round),
            )
        };
        if from_low == from_high {
            return from_low;
        }
        bits *= 2;
    }
}

/// Digit string and exponent of `value` in `base`.
///
/// `digits == 0` selects [`round_trip_digits`]. Non-regular values produce
/// `("nan" | "inf" | "-inf" | "0" | "-0", 0)`.
pub fn to_digits(
    value: &BigFloat,
    base: u32,
    digits: usize,
    round: RoundingMode,
) -> (String, isize) {
    let (negative, magnitude, exp2) = match value.finite_parts() {
        Some(parts) => parts,
        None => {
            let text = if value.is_nan() {
                "nan"
            } else if value.is_infinite() {
                if value.is_sign_negative() {
                    "-inf"
                } else {
                    "inf"
                }
            } else if value.is_sign_negative() {
                "-0"
            } else {
                "0"
            };
            return (text.to_string(), 0);
        }
    };
    let n = if digits == 0 {
        round_trip_digits(value.precision_bits(), base)
    } else {
        digits
    };

    // Start from an estimate of the exponent and correct it until the rounded
    // digits have exactly n places.
    let log_base_2 = 1.0 / libm::log2(base as f64);
    let top_bit = (magnitude.bit_len() as isize + exp2 - 1) as f64;
    let mut exponent = libm::floor(top_bit * log_base_2) as isize + 1;

    let big_base = UBig::from(base);
    let lower = big_base.pow(n - 1);
    let upper = &lower * &big_base;
    let mut guard = 0;
    loop {
        let scale = n as isize - exponent;
        let rounded = scaled_round(negative, &magnitude, exp2, base, scale, n, round);

        guard += 1;
        if rounded >= upper && guard < 8 {
            exponent += 1;
            continue;
        }
        if rounded < lower && guard < 8 {
            exponent -= 1;
            continue;
        }

        let mut text = radix_string(rounded, base);
        if negative {
            text.insert(0, '-');
        }
        return (text, exponent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearest(value: &BigFloat, base: u32, digits: usize) -> (String, isize) {
        to_digits(value, base, digits, RoundingMode::Nearest)
    }

    #[test]
    fn round_trip_digit_counts() {
        assert_eq!(round_trip_digits(53, 10), 17);
        assert_eq!(round_trip_digits(53, 2), 54);
        assert_eq!(round_trip_digits(24, 16), 7);
    }

    #[test]
    fn decimal_digits_of_simple_values() {
        let v = BigFloat::with_precision(1.5, 53);
        assert_eq!(nearest(&v, 10, 5), ("15000".to_string(), 1));
        let v = BigFloat::with_precision(-0.03125, 53);
        assert_eq!(nearest(&v, 10, 3), ("-312".to_string(), -1));
    }

    #[test]
    fn carry_into_a_new_digit_moves_the_exponent() {
        let v = BigFloat::with_precision(9.99, 53);
        assert_eq!(nearest(&v, 10, 2), ("10".to_string(), 2));
    }

    #[test]
    fn directed_rounding_of_digits() {
        let v = BigFloat::with_precision(2.0 / 3.0, 53);
        assert_eq!(to_digits(&v, 10, 3, RoundingMode::Down).0, "666");
        assert_eq!(to_digits(&v, 10, 3, RoundingMode::Up).0, "667");
    }

    #[test]
    fn binary_and_large_bases() {
        let v = BigFloat::with_precision(5.0, 53);
        assert_eq!(nearest(&v, 2, 3), ("101".to_string(), 3));
        let v = BigFloat::with_precision(61.0, 53);
        assert_eq!(nearest(&v, 62, 2), ("z0".to_string(), 1));
    }

    #[test]
    fn specials_have_fixed_spellings() {
        assert_eq!(nearest(&BigFloat::nan(53), 10, 0).0, "nan");
        assert_eq!(nearest(&BigFloat::infinity(true, 53), 10, 0).0, "-inf");
        assert_eq!(nearest(&BigFloat::signed_zero(true, 53), 10, 0).0, "-0");
    }

    #[test]
    fn approximate_scaling_agrees_with_exact_scaling() {
        let modes = [
            RoundingMode::Nearest,
            RoundingMode::TowardZero,
            RoundingMode::Up,
            RoundingMode::Down,
            RoundingMode::AwayFromZero,
        ];
        let magnitude = UBig::from(0xdead_beef_u64);
        let cases = [
            (10_u32, 5000_isize, -1480_isize),
            (10, -5000, 1520),
            (3, 900, -600),
            (62, -9000, 1520),
        ];
        for (base, exp2, scale) in cases {
            let power = UBig::from(base).pow(scale.unsigned_abs());
            for negative in [false, true] {
                for round in modes {
                    let exact = if scale >= 0 {
                        round_shifted(negative, &magnitude * &power, exp2, UBig::ONE, round)
                    } else {
                        round_shifted(negative, magnitude.clone(), exp2, power.clone(), round)
                    };
                    let scaled = scaled_round(negative, &magnitude, exp2, base, scale, 20, round);
                    assert_eq!(scaled, exact, "base {} scale {} {:?}", base, scale, round);
                }
            }
        }
    }

    #[test]
    fn far_exponents_format_without_expanding() {
        let (v, _) =
            BigFloat::from_str_radix("1@1000000000", 2, 53, RoundingMode::Nearest).unwrap();
        assert_eq!(nearest(&v, 16, 10), ("1000000000".to_string(), 250_000_001));
        let (digits, exponent) = nearest(&v, 10, 10);
        assert_eq!(digits.len(), 10);
        // 2^(10^9) = 0.D × 10^E with E = floor(10^9 × log10(2)) + 1.
        assert_eq!(exponent, 301_029_996);
    }
}
