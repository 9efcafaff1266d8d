use std::cmp::Ordering;

use dashu::integer::{IBig, UBig};
use dashu::rational::RBig;
use dashu_base::{BitTest, Sign, UnsignedAbs};
use dashu_float::round::{mode, Round};
use dashu_float::{DBig, FBig};
use serde::{Deserialize, Serialize};

use crate::context::{DEFAULT_EMAX, DEFAULT_EMIN};
use crate::digits::to_digits;
use crate::error::{Error, Result};
use crate::real_literal::scan;
use crate::round::{ternary_for_magnitude, RoundingMode};

/// Mantissa width of an IEEE 754 binary64 value.
pub const DOUBLE_MANTISSA_BITS: usize = 53;

/// One component of a complex value: an arbitrary precision binary float
/// with explicit precision.
///
/// Finite non-zero values are held in an `FBig` whose significand never has
/// more than `precision_bits` bits. NaN, infinities and signed zeros are kept
/// outside `FBig`, which cannot represent them.
#[derive(Clone, Debug)]
pub struct BigFloat {
    value: BigFloatValue,
    precision_bits: usize,
}

#[derive(Clone, Debug)]
pub enum BigFloatValue {
    Nan,
    Infinite { negative: bool },
    Zero { negative: bool },
    Finite(FBig),
}

/// Round an exact binary value to `precision` bits, reporting the direction
/// of the rounding.
fn round_fbig(exact: FBig, precision: usize, round: RoundingMode) -> (FBig, Ordering) {
    match round {
        RoundingMode::Nearest => round_in::<mode::HalfEven>(exact, precision),
        RoundingMode::TowardZero => round_in::<mode::Zero>(exact, precision),
        RoundingMode::Up => round_in::<mode::Up>(exact, precision),
        RoundingMode::Down => round_in::<mode::Down>(exact, precision),
        RoundingMode::AwayFromZero => round_in::<mode::Away>(exact, precision),
    }
}

fn round_in<R: Round>(exact: FBig, precision: usize) -> (FBig, Ordering) {
    let rounded = exact
        .clone()
        .with_rounding::<R>()
        .with_precision(precision)
        .value()
        .with_rounding::<mode::Zero>();
    let ternary = rounded.partial_cmp(&exact).unwrap_or(Ordering::Equal);
    (rounded, ternary)
}

fn signed(negative: bool, magnitude: UBig) -> IBig {
    let value = IBig::from(magnitude);
    if negative {
        -value
    } else {
        value
    }
}

fn is_power_of_two(magnitude: &UBig) -> bool {
    *magnitude != UBig::ZERO && (magnitude.clone() & (magnitude.clone() - UBig::ONE)) == UBig::ZERO
}

/// Exponent range of IEEE 754 binary64, with `2^(e-1) <= |x| < 2^e`.
const DOUBLE_EMIN: isize = -1073;
const DOUBLE_EMAX: isize = 1024;

/// Slack on both sides of an exponent range when pinning a value that is
/// known to lie outside it. Covers the error of the exponent estimate and a
/// carry out of the rounding.
const RANGE_MARGIN: isize = 4;

/// An exact value `±mantissa × base^base_power × 2^two_power` that has not
/// been expanded yet.
pub(crate) struct ScaledInteger<'a> {
    pub negative: bool,
    pub mantissa: &'a UBig,
    pub base: u32,
    pub base_power: i64,
    pub two_power: i64,
}

impl ScaledInteger<'_> {
    /// Correctly rounded value, unless its exponent is certainly outside
    /// `[emin, emax]`. Such values are pinned a few binades beyond the range
    /// with the mantissa's sign, which is all a range check looks at.
    pub(crate) fn round(
        &self,
        precision_bits: usize,
        round: RoundingMode,
        emin: isize,
        emax: isize,
    ) -> (BigFloat, Ordering) {
        if *self.mantissa == UBig::ZERO {
            return (
                BigFloat::signed_zero(self.negative, precision_bits),
                Ordering::Equal,
            );
        }
        let mantissa_bits = self.mantissa.bit_len() as isize;
        let significand = signed(self.negative, self.mantissa.clone());

        let estimate = mantissa_bits as f64
            + self.base_power as f64 * libm::log2(self.base as f64)
            + self.two_power as f64;
        let high = emax.saturating_add(RANGE_MARGIN);
        let low = emin.saturating_sub(RANGE_MARGIN);
        if estimate > high as f64 {
            let exponent = high.saturating_sub(mantissa_bits);
            return BigFloat::from_parts(significand, exponent, precision_bits, round);
        }
        if estimate < low as f64 {
            let exponent = low.saturating_sub(mantissa_bits);
            return BigFloat::from_parts(significand, exponent, precision_bits, round);
        }

        // Within the range every exponent below fits comfortably in an isize.
        if self.base.is_power_of_two() {
            let exponent = self
                .base_power
                .saturating_mul(self.base.trailing_zeros() as i64)
                .saturating_add(self.two_power);
            return BigFloat::from_parts(significand, exponent as isize, precision_bits, round);
        }
        let big_base = UBig::from(self.base);
        let mut numerator = self.mantissa.clone();
        let mut denominator = UBig::ONE;
        if self.base_power >= 0 {
            numerator = numerator * big_base.pow(self.base_power as usize);
        } else {
            denominator = big_base.pow(self.base_power.unsigned_abs() as usize);
        }
        if self.two_power >= 0 {
            numerator = numerator << self.two_power as usize;
        } else {
            denominator = denominator << self.two_power.unsigned_abs() as usize;
        }
        BigFloat::from_ratio(
            self.negative,
            &numerator,
            &denominator,
            precision_bits,
            round,
        )
    }
}

impl BigFloat {
    /// Create from f64, rounding to nearest at the given precision.
    pub fn with_precision(val: f64, precision_bits: usize) -> Self {
        Self::from_f64(val, precision_bits, RoundingMode::Nearest).0
    }

    /// Create positive zero with explicit precision
    pub fn zero(precision_bits: usize) -> Self {
        Self::signed_zero(false, precision_bits)
    }

    pub fn signed_zero(negative: bool, precision_bits: usize) -> Self {
        Self {
            value: BigFloatValue::Zero { negative },
            precision_bits,
        }
    }

    /// Create one with explicit precision
    pub fn one(precision_bits: usize) -> Self {
        Self::from_ibig(&IBig::ONE, precision_bits, RoundingMode::Nearest).0
    }

    pub fn nan(precision_bits: usize) -> Self {
        Self {
            value: BigFloatValue::Nan,
            precision_bits,
        }
    }

    pub fn infinity(negative: bool, precision_bits: usize) -> Self {
        Self {
            value: BigFloatValue::Infinite { negative },
            precision_bits,
        }
    }

    /// Parse a complete base-10 real literal, rounding to nearest.
    pub fn from_string(val: &str, precision_bits: usize) -> Result<Self> {
        Self::from_str_radix(val, 10, precision_bits, RoundingMode::Nearest).map(|(v, _)| v)
    }

    /// Parse a complete real literal in `base`, reporting the rounding
    /// direction. Surrounding whitespace is not accepted.
    ///
    /// Literals far outside the default exponent range are not expanded;
    /// they come back just beyond it, so a later range check still sees
    /// them overflow or underflow.
    pub fn from_str_radix(
        val: &str,
        base: u32,
        precision_bits: usize,
        round: RoundingMode,
    ) -> Result<(Self, Ordering)> {
        if !(2..=62).contains(&base) {
            return Err(Error::OutOfRange(format!("unsupported base {}", base)));
        }
        match scan(val.as_bytes(), base) {
            Some(literal) if literal.len == val.len() => Ok(literal.round(
                base,
                precision_bits,
                round,
                DEFAULT_EMIN,
                DEFAULT_EMAX,
            )),
            _ => Err(Error::Value(format!("invalid real literal '{}'", val))),
        }
    }

    /// Get precision in bits
    pub fn precision_bits(&self) -> usize {
        self.precision_bits
    }

    pub fn value(&self) -> &BigFloatValue {
        &self.value
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.value, BigFloatValue::Nan)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.value, BigFloatValue::Infinite { .. })
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.value, BigFloatValue::Zero { .. })
    }

    pub fn is_sign_negative(&self) -> bool {
        match &self.value {
            BigFloatValue::Nan => false,
            BigFloatValue::Infinite { negative } | BigFloatValue::Zero { negative } => *negative,
            BigFloatValue::Finite(f) => f.repr().significand().sign() == Sign::Negative,
        }
    }

    /// Binary exponent `e` of a regular value, with `2^(e-1) <= |x| < 2^e`.
    pub fn exponent(&self) -> Option<isize> {
        self.finite_parts()
            .map(|(_, magnitude, exp)| magnitude.bit_len() as isize + exp)
    }

    /// Whether a regular value's exponent lies in `[emin, emax]`. Zeros,
    /// infinities and NaN are always in range.
    pub fn in_exponent_range(&self, emin: isize, emax: isize) -> bool {
        self.exponent().map_or(true, |e| emin <= e && e <= emax)
    }

    /// Sign, significand magnitude and binary exponent of a regular value.
    pub(crate) fn finite_parts(&self) -> Option<(bool, UBig, isize)> {
        match &self.value {
            BigFloatValue::Finite(f) => {
                let significand = f.repr().significand();
                let negative = significand.sign() == Sign::Negative;
                Some((
                    negative,
                    significand.clone().unsigned_abs(),
                    f.repr().exponent(),
                ))
            }
            _ => None,
        }
    }

    /// Round `significand × 2^exponent` to `precision_bits`.
    pub(crate) fn from_parts(
        significand: IBig,
        exponent: isize,
        precision_bits: usize,
        round: RoundingMode,
    ) -> (Self, Ordering) {
        if significand == IBig::ZERO {
            return (Self::zero(precision_bits), Ordering::Equal);
        }
        let (rounded, ternary) = round_fbig(
            FBig::from_parts(significand, exponent),
            precision_bits,
            round,
        );
        (
            Self {
                value: BigFloatValue::Finite(rounded),
                precision_bits,
            },
            ternary,
        )
    }

    /// Correctly rounded `±numerator / denominator`. The denominator must be
    /// non-zero.
    ///
    /// The quotient is computed with at least `precision_bits + 3` bits and a
    /// sticky bit for the remainder, so a single rounding of that
    /// approximation agrees with rounding the exact ratio.
    pub(crate) fn from_ratio(
        negative: bool,
        numerator: &UBig,
        denominator: &UBig,
        precision_bits: usize,
        round: RoundingMode,
    ) -> (Self, Ordering) {
        if *numerator == UBig::ZERO {
            return (Self::signed_zero(negative, precision_bits), Ordering::Equal);
        }
        let shift = precision_bits as isize + 3 + denominator.bit_len() as isize
            - numerator.bit_len() as isize;
        let (scaled_num, scaled_den) = if shift >= 0 {
            (numerator.clone() << shift as usize, denominator.clone())
        } else {
            (numerator.clone(), denominator.clone() << (-shift) as usize)
        };
        let quotient = &scaled_num / &scaled_den;
        let remainder = &scaled_num % &scaled_den;
        let sticky = if remainder == UBig::ZERO {
            UBig::ZERO
        } else {
            UBig::ONE
        };
        let significand = signed(negative, (quotient << 1usize) + sticky);
        Self::from_parts(significand, -shift - 1, precision_bits, round)
    }

    /// Set from an arbitrary precision integer.
    pub fn from_ibig(val: &IBig, precision_bits: usize, round: RoundingMode) -> (Self, Ordering) {
        Self::from_parts(val.clone(), 0, precision_bits, round)
    }

    /// Set from an arbitrary precision rational.
    pub fn from_rbig(val: &RBig, precision_bits: usize, round: RoundingMode) -> (Self, Ordering) {
        let numerator = val.numerator();
        let negative = numerator.sign() == Sign::Negative;
        Self::from_ratio(
            negative,
            &numerator.clone().unsigned_abs(),
            val.denominator(),
            precision_bits,
            round,
        )
    }

    /// Set from a decimal float, `significand × 10^exponent`.
    ///
    /// Decimals whose magnitude is far outside `[emin, emax]` are pinned
    /// just beyond the range instead of being expanded.
    pub fn from_dbig(
        val: &DBig,
        precision_bits: usize,
        round: RoundingMode,
        emin: isize,
        emax: isize,
    ) -> (Self, Ordering) {
        let significand = val.repr().significand();
        let mantissa = significand.clone().unsigned_abs();
        ScaledInteger {
            negative: significand.sign() == Sign::Negative,
            mantissa: &mantissa,
            base: 10,
            base_power: val.repr().exponent() as i64,
            two_power: 0,
        }
        .round(precision_bits, round, emin, emax)
    }

    /// Set from a native double.
    pub fn from_f64(val: f64, precision_bits: usize, round: RoundingMode) -> (Self, Ordering) {
        if val.is_nan() {
            return (Self::nan(precision_bits), Ordering::Equal);
        }
        if val.is_infinite() {
            return (
                Self::infinity(val.is_sign_negative(), precision_bits),
                Ordering::Equal,
            );
        }
        if val == 0.0 {
            return (
                Self::signed_zero(val.is_sign_negative(), precision_bits),
                Ordering::Equal,
            );
        }
        // frexp returns (mantissa, exponent) where |mantissa| is in [0.5, 1.0)
        let (mantissa, exp) = libm::frexp(val);
        let significand = libm::ldexp(mantissa, DOUBLE_MANTISSA_BITS as i32) as i64;
        Self::from_parts(
            IBig::from(significand),
            exp as isize - DOUBLE_MANTISSA_BITS as isize,
            precision_bits,
            round,
        )
    }

    /// Copy at a new precision.
    pub fn round_to(&self, precision_bits: usize, round: RoundingMode) -> (Self, Ordering) {
        match &self.value {
            BigFloatValue::Finite(f) => {
                let (rounded, ternary) = round_fbig(f.clone(), precision_bits, round);
                (
                    Self {
                        value: BigFloatValue::Finite(rounded),
                        precision_bits,
                    },
                    ternary,
                )
            }
            other => (
                Self {
                    value: other.clone(),
                    precision_bits,
                },
                Ordering::Equal,
            ),
        }
    }

    /// Bring a regular value into the exponent range `[emin, emax]`.
    ///
    /// `ternary` is the code of the assignment that produced `self`; the
    /// returned code is relative to the same exact value.
    pub fn check_range(
        self,
        ternary: Ordering,
        round: RoundingMode,
        emin: isize,
        emax: isize,
    ) -> (Self, Ordering) {
        let (negative, magnitude, exp) = match self.finite_parts() {
            Some(parts) => parts,
            None => return (self, ternary),
        };
        let e = magnitude.bit_len() as isize + exp;
        let precision_bits = self.precision_bits;

        if e > emax {
            if round.overflows_to_infinity(negative) {
                return (
                    Self::infinity(negative, precision_bits),
                    ternary_for_magnitude(negative, false),
                );
            }
            let largest = (UBig::ONE << precision_bits) - UBig::ONE;
            let (value, _) = Self::from_parts(
                signed(negative, largest),
                emax - precision_bits as isize,
                precision_bits,
                round,
            );
            return (value, ternary_for_magnitude(negative, true));
        }

        if e < emin {
            let away = match round {
                // Halfway between zero and the smallest magnitude ties to zero
                // unless the exact value lies beyond it.
                RoundingMode::Nearest => {
                    e == emin - 1
                        && (!is_power_of_two(&magnitude)
                            || ternary == ternary_for_magnitude(negative, true))
                }
                directed => directed.underflows_away_from_zero(negative),
            };
            if away {
                let (value, _) =
                    Self::from_parts(signed(negative, UBig::ONE), emin - 1, precision_bits, round);
                return (value, ternary_for_magnitude(negative, false));
            }
            return (
                Self::signed_zero(negative, precision_bits),
                ternary_for_magnitude(negative, true),
            );
        }

        (self, ternary)
    }

    /// Emulate subnormal numbers: a regular value with
    /// `e < emin + precision - 1` keeps only `e - emin + 1` significant bits.
    ///
    /// The incoming `ternary` is folded in as a sticky bit below the
    /// significand so ties are broken towards the exact value instead of
    /// being rounded twice.
    pub fn subnormalize(
        self,
        ternary: Ordering,
        round: RoundingMode,
        emin: isize,
    ) -> (Self, Ordering) {
        let current = match &self.value {
            BigFloatValue::Finite(f) => f.clone(),
            _ => return (self, ternary),
        };
        let e = match self.exponent() {
            Some(e) => e,
            None => return (self, ternary),
        };
        if e >= emin + self.precision_bits as isize - 1 {
            return (self, ternary);
        }
        let target_bits = (e - emin + 1).max(1) as usize;

        let significand = current.repr().significand().clone();
        let exp = current.repr().exponent();
        let with_sticky = match ternary {
            Ordering::Equal => current.clone(),
            Ordering::Less => FBig::from_parts((significand << 1usize) + IBig::ONE, exp - 1),
            Ordering::Greater => FBig::from_parts((significand << 1usize) - IBig::ONE, exp - 1),
        };
        let (rounded, sticky_ternary) = round_fbig(with_sticky, target_bits, round);
        let ternary = if rounded == current {
            ternary
        } else {
            sticky_ternary
        };
        (
            Self {
                value: BigFloatValue::Finite(rounded),
                precision_bits: self.precision_bits,
            },
            ternary,
        )
    }

    /// Convert to a native double using `round`.
    pub fn to_f64(&self, round: RoundingMode) -> f64 {
        match &self.value {
            BigFloatValue::Nan => f64::NAN,
            BigFloatValue::Infinite { negative: false } => f64::INFINITY,
            BigFloatValue::Infinite { negative: true } => f64::NEG_INFINITY,
            BigFloatValue::Zero { negative: false } => 0.0,
            BigFloatValue::Zero { negative: true } => -0.0,
            BigFloatValue::Finite(f) => {
                let (rounded, ternary) = round_fbig(f.clone(), DOUBLE_MANTISSA_BITS, round);
                let (clamped, ternary) = Self {
                    value: BigFloatValue::Finite(rounded),
                    precision_bits: DOUBLE_MANTISSA_BITS,
                }
                .check_range(ternary, round, DOUBLE_EMIN, DOUBLE_EMAX);
                // Below 2^-1021 a double holds fewer bits; the narrowing is
                // rounded here so the conversion below is exact.
                let (narrowed, _) = clamped.subnormalize(ternary, round, DOUBLE_EMIN);
                match narrowed.value {
                    BigFloatValue::Finite(v) => v.to_f64().value(),
                    _ => narrowed.to_f64(round),
                }
            }
        }
    }
}

impl PartialEq for BigFloat {
    fn eq(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (BigFloatValue::Zero { .. }, BigFloatValue::Zero { .. }) => true,
            (
                BigFloatValue::Infinite { negative: a },
                BigFloatValue::Infinite { negative: b },
            ) => a == b,
            (BigFloatValue::Finite(a), BigFloatValue::Finite(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for BigFloat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = crate::serialize::significant_digits(self.precision_bits);
        write!(f, "{}", crate::serialize::format_general(self, digits))
    }
}

#[derive(Serialize, Deserialize)]
struct BigFloatSerde {
    value: String,
    precision_bits: usize,
}

/// Hexadecimal literal with enough digits to be exact at the value's
/// precision.
fn exact_hex_literal(val: &BigFloat) -> String {
    match &val.value {
        BigFloatValue::Nan => "@nan@".to_string(),
        BigFloatValue::Infinite { negative: false } => "@inf@".to_string(),
        BigFloatValue::Infinite { negative: true } => "-@inf@".to_string(),
        BigFloatValue::Zero { negative: false } => "0".to_string(),
        BigFloatValue::Zero { negative: true } => "-0".to_string(),
        BigFloatValue::Finite(_) => {
            let (digits, exponent) = to_digits(val, 16, 0, RoundingMode::Nearest);
            match digits.strip_prefix('-') {
                Some(rest) => format!("-0.{}@{}", rest, exponent),
                None => format!("0.{}@{}", digits, exponent),
            }
        }
    }
}

impl Serialize for BigFloat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let serde = BigFloatSerde {
            value: exact_hex_literal(self),
            precision_bits: self.precision_bits,
        };

        serde.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigFloat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serde = BigFloatSerde::deserialize(deserializer)?;

        if serde.precision_bits == 0 {
            return Err(serde::de::Error::custom("precision_bits must be at least 1"));
        }

        BigFloat::from_str_radix(
            &serde.value,
            16,
            serde.precision_bits,
            RoundingMode::Nearest,
        )
        .map(|(value, _)| value)
        .map_err(|e| serde::de::Error::custom(format!("Failed to parse BigFloat: {}", e)))
    }
}
