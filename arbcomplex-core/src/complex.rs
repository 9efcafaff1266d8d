//! The canonical arbitrary precision complex value.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::bigfloat::BigFloat;
use crate::context::Context;
use crate::round::{pack_inex, Ordering2, Round2, RoundingMode};

/// Complex number with independently sized real and imaginary components.
///
/// Values are immutable once a conversion returns them. Conversions hand
/// them out as `Arc<BigComplex>`; a conversion that needs no change returns
/// the same `Arc`, so callers may rely on `Arc::ptr_eq` for identity and must
/// not expect a private copy.
#[derive(Clone, Debug)]
pub struct BigComplex {
    re: BigFloat,
    im: BigFloat,
    /// Ternary codes of the assignment that built this value.
    rc: Ordering2,
    /// Rounding modes in effect when this value was built.
    round: Round2,
}

impl BigComplex {
    pub(crate) fn from_components(
        re: BigFloat,
        im: BigFloat,
        rc: Ordering2,
        round: Round2,
    ) -> Self {
        Self { re, im, rc, round }
    }

    /// Exact value from two components, rounded to nearest.
    pub fn new(re: BigFloat, im: BigFloat) -> Self {
        Self::from_components(
            re,
            im,
            (Ordering::Equal, Ordering::Equal),
            (RoundingMode::Nearest, RoundingMode::Nearest),
        )
    }

    /// Create zero with explicit component precisions
    pub fn zero(real_bits: usize, imag_bits: usize) -> Self {
        Self::new(BigFloat::zero(real_bits), BigFloat::zero(imag_bits))
    }

    pub fn real(&self) -> &BigFloat {
        &self.re
    }

    pub fn imag(&self) -> &BigFloat {
        &self.im
    }

    /// Precision of the real and imaginary component in bits.
    pub fn precision_bits(&self) -> (usize, usize) {
        (self.re.precision_bits(), self.im.precision_bits())
    }

    pub fn rc(&self) -> Ordering2 {
        self.rc
    }

    /// `rc` packed into one code; zero means both components are exact.
    pub fn packed_rc(&self) -> u8 {
        pack_inex(self.rc)
    }

    pub fn round(&self) -> Round2 {
        self.round
    }

    /// Not-a-number: both components are NaN.
    pub fn is_nan(&self) -> bool {
        self.re.is_nan() && self.im.is_nan()
    }

    /// Both regular component exponents lie in `[emin, emax]`.
    pub fn in_exponent_range(&self, emin: isize, emax: isize) -> bool {
        self.re.in_exponent_range(emin, emax) && self.im.in_exponent_range(emin, emax)
    }

    pub(crate) fn into_components(self) -> (BigFloat, BigFloat, Ordering2, Round2) {
        (self.re, self.im, self.rc, self.round)
    }

    /// Convert to a native complex pair using the context rounding modes.
    pub fn to_c64(&self, context: &Context) -> (f64, f64) {
        (
            self.re.to_f64(context.real_round()),
            self.im.to_f64(context.imag_round()),
        )
    }
}

impl PartialEq for BigComplex {
    fn eq(&self, other: &Self) -> bool {
        self.re == other.re && self.im == other.im
    }
}

#[derive(Serialize, Deserialize)]
struct BigComplexSerde {
    real: BigFloat,
    imag: BigFloat,
}

impl Serialize for BigComplex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        BigComplexSerde {
            real: self.re.clone(),
            imag: self.im.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigComplex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serde = BigComplexSerde::deserialize(deserializer)?;
        Ok(BigComplex::new(serde.real, serde.imag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_has_requested_precisions_and_exact_rc() {
        let z = BigComplex::zero(64, 128);
        assert_eq!(z.precision_bits(), (64, 128));
        assert_eq!(z.packed_rc(), 0);
        assert!(z.real().is_zero());
    }

    #[test]
    fn nan_needs_both_components() {
        let half = BigComplex::new(BigFloat::nan(53), BigFloat::zero(53));
        let both = BigComplex::new(BigFloat::nan(53), BigFloat::nan(53));
        assert!(!half.is_nan());
        assert!(both.is_nan());
    }

    #[test]
    fn to_c64_uses_component_rounding() {
        let third = BigFloat::from_string("0.333333333333333333333333", 100).unwrap();
        let z = BigComplex::new(third.clone(), third);
        let mut ctx = Context::new();
        ctx.real_round = Some(RoundingMode::Down);
        ctx.imag_round = Some(RoundingMode::Up);
        let (re, im) = z.to_c64(&ctx);
        assert!(re < im);
        assert_eq!(im, f64::from_bits(re.to_bits() + 1));
    }

    /// `±(1 + 2^-a + 2^-b) × 2^-1060` (terms with a zero position are left
    /// out), exact at 80 bits.
    fn below_double_normal(negative: bool, a: usize, b: usize) -> BigFloat {
        let mut fraction = vec![b'0'; 70];
        for position in [a, b] {
            if position > 0 {
                fraction[position - 1] = b'1';
            }
        }
        let literal = format!(
            "{}1.{}@-1060",
            if negative { "-" } else { "" },
            String::from_utf8_lossy(&fraction)
        );
        let (value, ternary) =
            BigFloat::from_str_radix(&literal, 2, 80, RoundingMode::Nearest).unwrap();
        assert_eq!(ternary, std::cmp::Ordering::Equal);
        value
    }

    #[test]
    fn to_c64_rounds_double_subnormals_once() {
        // 2^-1060 has 15 significant bits left as a double.
        let smallest = |units: u64| f64::from_bits(units);
        let mut ctx = Context::new();

        let above_tie = BigComplex::new(
            below_double_normal(false, 15, 70),
            below_double_normal(false, 15, 0),
        );
        assert_eq!(
            above_tie.to_c64(&ctx),
            (smallest(16385), smallest(16384))
        );

        let just_above = BigComplex::new(
            below_double_normal(false, 0, 70),
            below_double_normal(true, 0, 70),
        );
        ctx.real_round = Some(RoundingMode::Up);
        ctx.imag_round = Some(RoundingMode::Down);
        assert_eq!(
            just_above.to_c64(&ctx),
            (smallest(16385), -smallest(16385))
        );

        ctx.real_round = Some(RoundingMode::TowardZero);
        ctx.imag_round = Some(RoundingMode::TowardZero);
        assert_eq!(
            just_above.to_c64(&ctx),
            (smallest(16384), -smallest(16384))
        );
    }
}
