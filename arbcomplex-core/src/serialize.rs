//! Text output: per-component digit strings in any base, and the decimal
//! presentation used by `Display` and `repr`.

use std::fmt;

use crate::bigfloat::{BigFloat, BigFloatValue, DOUBLE_MANTISSA_BITS};
use crate::complex::BigComplex;
use crate::context::Context;
use crate::digits::to_digits;
use crate::error::{Error, Result};
use crate::round::RoundingMode;
use crate::text::{MAX_BASE, MIN_BASE};

/// One component as a digit string: `value ≈ 0.digits × base^exponent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentText {
    /// Signed digits, or one of `nan`, `inf`, `-inf`, `0`, `-0`.
    pub digits: String,
    pub exponent: isize,
    pub precision_bits: usize,
}

impl ComponentText {
    /// A real literal that reads back to the same value in the base the
    /// digits were produced in.
    pub fn to_literal(&self) -> String {
        match self.digits.as_str() {
            "nan" => "@nan@".to_string(),
            "inf" => "@inf@".to_string(),
            "-inf" => "-@inf@".to_string(),
            "0" | "-0" => self.digits.clone(),
            digits => match digits.strip_prefix('-') {
                Some(rest) => format!("-0.{}@{}", rest, self.exponent),
                None => format!("0.{}@{}", digits, self.exponent),
            },
        }
    }
}

/// Both components of a complex value as digit strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexText {
    pub real: ComponentText,
    pub imag: ComponentText,
}

impl ComplexText {
    /// `(re im)`, accepted by the complex literal parser at the same base.
    pub fn to_literal(&self) -> String {
        format!("({} {})", self.real.to_literal(), self.imag.to_literal())
    }
}

fn component_text(
    value: &BigFloat,
    base: u32,
    digits: usize,
    round: RoundingMode,
) -> ComponentText {
    let (digits, exponent) = to_digits(value, base, digits, round);
    ComponentText {
        digits,
        exponent,
        precision_bits: value.precision_bits(),
    }
}

/// Format both components of `value` in `base` with `digits` significant
/// digits, using the context rounding mode of each component.
///
/// `digits == 0` produces as many digits as are needed to read the value
/// back exactly. `base` must be in `2..=62` and `digits` must be 0 or at
/// least 2.
pub fn to_text(
    value: &BigComplex,
    base: u32,
    digits: usize,
    context: &Context,
) -> Result<ComplexText> {
    if !(MIN_BASE..=MAX_BASE).contains(&base) {
        return Err(Error::OutOfRange(format!(
            "base must be in the interval [{}, {}]",
            MIN_BASE, MAX_BASE
        )));
    }
    if digits == 1 {
        return Err(Error::OutOfRange(
            "digits must be 0 or at least 2".to_string(),
        ));
    }
    Ok(ComplexText {
        real: component_text(value.real(), base, digits, context.real_round()),
        imag: component_text(value.imag(), base, digits, context.imag_round()),
    })
}

/// Significant decimal digits shown for a component of `precision_bits`.
pub fn significant_digits(precision_bits: usize) -> usize {
    libm::floor(libm::log10(2.0) * precision_bits as f64) as usize + 2
}

/// Decimal text in the style of `%g` with at most `sig_digits` significant
/// digits, trailing zeros removed but always showing a fractional part
/// (`1.0`, `1.0e+20`).
pub fn format_general(value: &BigFloat, sig_digits: usize) -> String {
    match value.value() {
        BigFloatValue::Nan => return "nan".to_string(),
        BigFloatValue::Infinite { negative: false } => return "inf".to_string(),
        BigFloatValue::Infinite { negative: true } => return "-inf".to_string(),
        BigFloatValue::Zero { negative: false } => return "0.0".to_string(),
        BigFloatValue::Zero { negative: true } => return "-0.0".to_string(),
        BigFloatValue::Finite(_) => {}
    }

    let sig_digits = sig_digits.max(1);
    let (text, exponent) = to_digits(value, 10, sig_digits, RoundingMode::Nearest);
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let digits = digits.trim_end_matches('0');
    // Decimal exponent of the leading digit.
    let point = exponent - 1;

    if point < -4 || point >= sig_digits as isize {
        let (head, tail) = digits.split_at(1);
        let tail = if tail.is_empty() { "0" } else { tail };
        let exp_sign = if point < 0 { '-' } else { '+' };
        format!("{}{}.{}e{}{:02}", sign, head, tail, exp_sign, point.abs())
    } else if point < 0 {
        let zeros = "0".repeat((-point - 1) as usize);
        format!("{}0.{}{}", sign, zeros, digits)
    } else {
        let int_len = point as usize + 1;
        if digits.len() <= int_len {
            let zeros = "0".repeat(int_len - digits.len());
            format!("{}{}{}.0", sign, digits, zeros)
        } else {
            format!("{}{}.{}", sign, &digits[..int_len], &digits[int_len..])
        }
    }
}

impl fmt::Display for BigComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let re = self.real().to_string();
        let im = self.imag().to_string();
        if im.starts_with('-') {
            write!(f, "{}{}j", re, im)
        } else {
            write!(f, "{}+{}j", re, im)
        }
    }
}

impl BigComplex {
    /// `BigComplex('re+imj')`, with the component precisions appended when
    /// either differs from 53 bits.
    pub fn repr(&self) -> String {
        let (real_bits, imag_bits) = self.precision_bits();
        if real_bits == DOUBLE_MANTISSA_BITS && imag_bits == DOUBLE_MANTISSA_BITS {
            format!("BigComplex('{}')", self)
        } else {
            format!("BigComplex('{}',({},{}))", self, real_bits, imag_bits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(val: f64) -> BigFloat {
        BigFloat::with_precision(val, 53)
    }

    #[test]
    fn general_format_switches_to_exponent_outside_range() {
        assert_eq!(format_general(&real(1.5), 17), "1.5");
        assert_eq!(format_general(&real(100.0), 17), "100.0");
        assert_eq!(format_general(&real(0.001), 17), "0.001");
        assert_eq!(format_general(&real(1e20), 17), "1.0e+20");
        assert_eq!(
            format_general(&real(-2.5e-7), 17),
            "-2.4999999999999999e-07"
        );
        assert_eq!(
            format_general(&real(-2.384185791015625e-7), 17),
            "-2.384185791015625e-07"
        );
        assert_eq!(format_general(&real(0.1), 17), "0.10000000000000001");
    }

    #[test]
    fn general_format_specials() {
        assert_eq!(format_general(&BigFloat::nan(53), 17), "nan");
        assert_eq!(format_general(&BigFloat::infinity(true, 53), 17), "-inf");
        assert_eq!(format_general(&BigFloat::signed_zero(true, 53), 17), "-0.0");
    }

    #[test]
    fn significant_digits_for_common_precisions() {
        assert_eq!(significant_digits(53), 17);
        assert_eq!(significant_digits(24), 9);
        assert_eq!(significant_digits(113), 36);
    }

    #[test]
    fn display_and_repr() {
        let z = BigComplex::new(real(1.0), real(-2.0));
        assert_eq!(z.to_string(), "1.0-2.0j");
        assert_eq!(z.repr(), "BigComplex('1.0-2.0j')");

        let w = BigComplex::new(BigFloat::with_precision(3.0, 60), BigFloat::zero(60));
        assert_eq!(w.repr(), "BigComplex('3.0+0.0j',(60,60))");
    }

    #[test]
    fn to_text_validates_base_and_digits() {
        let z = BigComplex::new(real(1.0), real(2.0));
        let ctx = Context::new();
        assert!(matches!(to_text(&z, 63, 0, &ctx), Err(Error::OutOfRange(_))));
        assert!(matches!(to_text(&z, 1, 0, &ctx), Err(Error::OutOfRange(_))));
        assert!(matches!(to_text(&z, 10, 1, &ctx), Err(Error::OutOfRange(_))));
        assert!(to_text(&z, 10, 0, &ctx).is_ok());
        assert!(to_text(&z, 10, 10, &ctx).is_ok());
    }

    #[test]
    fn to_text_components() {
        let z = BigComplex::new(real(1.5), real(-0.25));
        let text = to_text(&z, 10, 4, &Context::new()).unwrap();
        assert_eq!(text.real.digits, "1500");
        assert_eq!(text.real.exponent, 1);
        assert_eq!(text.imag.digits, "-2500");
        assert_eq!(text.imag.exponent, 0);
        assert_eq!(text.to_literal(), "(0.1500@1 -0.2500@0)");
    }

    #[test]
    fn to_text_uses_component_rounding() {
        let third = BigFloat::from_string("0.33333333333333333333", 80).unwrap();
        let z = BigComplex::new(third.clone(), third);
        let mut ctx = Context::new();
        ctx.real_round = Some(RoundingMode::Down);
        ctx.imag_round = Some(RoundingMode::Up);
        let text = to_text(&z, 10, 3, &ctx).unwrap();
        assert_eq!(text.real.digits, "333");
        assert_eq!(text.imag.digits, "334");
    }

    #[test]
    fn special_components_have_parseable_literals() {
        let z = BigComplex::new(BigFloat::nan(53), BigFloat::infinity(true, 53));
        let text = to_text(&z, 36, 0, &Context::new()).unwrap();
        assert_eq!(text.to_literal(), "(@nan@ -@inf@)");
    }
}
