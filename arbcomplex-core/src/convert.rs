//! Conversion of every supported source kind into `BigComplex`.
//!
//! [`convert_any`] is the entry point. It snapshots the context, routes the
//! source to its converter, and passes the assigned value through the shared
//! exception handling. Converters only resolve precision and assign; they
//! never touch the context flags themselves.

use std::cmp::Ordering;
use std::sync::Arc;

use dashu::integer::IBig;
use dashu::rational::RBig;
use dashu_base::{Sign, UnsignedAbs};
use dashu_float::DBig;

use crate::bigfloat::{BigFloat, DOUBLE_MANTISSA_BITS};
use crate::complex::BigComplex;
use crate::context::{Condition, Context, Targets};
use crate::error::{Error, Result};
use crate::exceptions::postprocess;
use crate::precision::PrecisionRequest;
use crate::text::parse_requested;

/// A value that can be converted to `BigComplex`.
#[derive(Clone, Debug)]
pub enum Number {
    /// An existing arbitrary precision complex value.
    Complex(Arc<BigComplex>),
    /// An arbitrary precision real value.
    Real(BigFloat),
    /// A native double.
    Float(f64),
    /// A native complex number as a (real, imaginary) pair of doubles.
    NativeComplex(f64, f64),
    /// An arbitrary precision rational.
    Rational(RBig),
    /// An arbitrary precision integer.
    Integer(IBig),
    /// A decimal float.
    Decimal(DBig),
    /// A numerator/denominator pair that need not be in lowest terms.
    Fraction(IBig, IBig),
    /// A machine integer.
    Int(i64),
    /// A complex literal, parsed in base 10.
    Text(String),
    /// A complex literal as raw bytes, parsed in base 10.
    Bytes(Vec<u8>),
    /// A host value of some other kind, identified by its type name.
    Other(String),
}

impl Number {
    /// Short name of the source kind, for diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Number::Complex(_) => "BigComplex",
            Number::Real(_) => "BigFloat",
            Number::Float(_) => "f64",
            Number::NativeComplex(..) => "complex",
            Number::Rational(_) => "RBig",
            Number::Integer(_) => "IBig",
            Number::Decimal(_) => "DBig",
            Number::Fraction(..) => "fraction",
            Number::Int(_) => "i64",
            Number::Text(_) => "str",
            Number::Bytes(_) => "bytes",
            Number::Other(name) => name,
        }
    }
}

impl From<BigComplex> for Number {
    fn from(value: BigComplex) -> Self {
        Number::Complex(Arc::new(value))
    }
}

impl From<Arc<BigComplex>> for Number {
    fn from(value: Arc<BigComplex>) -> Self {
        Number::Complex(value)
    }
}

impl From<BigFloat> for Number {
    fn from(value: BigFloat) -> Self {
        Number::Real(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<(f64, f64)> for Number {
    fn from((re, im): (f64, f64)) -> Self {
        Number::NativeComplex(re, im)
    }
}

impl From<RBig> for Number {
    fn from(value: RBig) -> Self {
        Number::Rational(value)
    }
}

impl From<IBig> for Number {
    fn from(value: IBig) -> Self {
        Number::Integer(value)
    }
}

impl From<DBig> for Number {
    fn from(value: DBig) -> Self {
        Number::Decimal(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<&str> for Number {
    fn from(value: &str) -> Self {
        Number::Text(value.to_string())
    }
}

impl From<String> for Number {
    fn from(value: String) -> Self {
        Number::Text(value)
    }
}

impl From<Vec<u8>> for Number {
    fn from(value: Vec<u8>) -> Self {
        Number::Bytes(value)
    }
}

/// Pair two independently assigned components, bringing each into the
/// context exponent range.
fn assemble(
    re: (BigFloat, Ordering),
    im: (BigFloat, Ordering),
    targets: &Targets,
) -> BigComplex {
    let (re, rc_re) = re
        .0
        .check_range(re.1, targets.real_round, targets.emin, targets.emax);
    let (im, rc_im) = im
        .0
        .check_range(im.1, targets.imag_round, targets.emin, targets.emax);
    BigComplex::from_components(re, im, (rc_re, rc_im), targets.round2())
}

fn exact_zero(precision_bits: usize) -> (BigFloat, Ordering) {
    (BigFloat::zero(precision_bits), Ordering::Equal)
}

/// Round both components of `source` to new precisions.
fn reround(
    source: &BigComplex,
    real_bits: usize,
    imag_bits: usize,
    targets: &Targets,
) -> BigComplex {
    assemble(
        source.real().round_to(real_bits, targets.real_round),
        source.imag().round_to(imag_bits, targets.imag_round),
        targets,
    )
}

/// Make an out-of-range complex value range-valid at its own precisions,
/// using the rounding modes and ternary codes it was built with.
fn clamp_to_range(source: &BigComplex, targets: &Targets) -> BigComplex {
    let (rc_re, rc_im) = source.rc();
    let (round_re, round_im) = source.round();
    let (re, rc_re) = source
        .real()
        .clone()
        .check_range(rc_re, round_re, targets.emin, targets.emax);
    let (im, rc_im) = source
        .imag()
        .clone()
        .check_range(rc_im, round_im, targets.emin, targets.emax);
    BigComplex::from_components(re, im, (rc_re, rc_im), source.round())
}

/// Round a clamped value to new precisions. A component that the second
/// rounding leaves unchanged keeps the ternary code of the clamp.
fn reround_clamped(
    clamped: &BigComplex,
    real_bits: usize,
    imag_bits: usize,
    targets: &Targets,
) -> BigComplex {
    let (rc_re, rc_im) = clamped.rc();
    let (re, t_re) = clamped.real().round_to(real_bits, targets.real_round);
    let (im, t_im) = clamped.imag().round_to(imag_bits, targets.imag_round);
    assemble((re, t_re.then(rc_re)), (im, t_im.then(rc_im)), targets)
}

fn from_complex(
    source: &Arc<BigComplex>,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
    context: &mut Context,
) -> Result<Arc<BigComplex>> {
    let (source_real, source_imag) = source.precision_bits();
    let real_bits = real.resolve(targets.real_prec, source_real);
    let imag_bits = imag.resolve(targets.imag_prec, source_imag);

    if source.in_exponent_range(targets.emin, targets.emax) {
        if (real_bits, imag_bits) == (source_real, source_imag) {
            return Ok(Arc::clone(source));
        }
        let assigned = reround(source, real_bits, imag_bits, targets);
        return postprocess(assigned, targets, context, false).map(Arc::new);
    }

    context.signal(Condition::ExpBound)?;
    log::debug!(
        "clamping BigComplex with exponent outside [{}, {}]",
        targets.emin,
        targets.emax
    );
    let clamped = clamp_to_range(source, targets);
    let assigned = if (real_bits, imag_bits) == (source_real, source_imag) {
        clamped
    } else {
        reround_clamped(&clamped, real_bits, imag_bits, targets)
    };
    postprocess(assigned, targets, context, false).map(Arc::new)
}

fn from_real(
    source: &BigFloat,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
) -> BigComplex {
    let source_bits = source.precision_bits();
    let real_bits = real.resolve(targets.real_prec, source_bits);
    let imag_bits = imag.resolve(targets.imag_prec, source_bits);
    assemble(
        source.round_to(real_bits, targets.real_round),
        exact_zero(imag_bits),
        targets,
    )
}

fn from_float(
    source: f64,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
) -> BigComplex {
    let real_bits = real.resolve(targets.real_prec, DOUBLE_MANTISSA_BITS);
    let imag_bits = imag.resolve(targets.imag_prec, DOUBLE_MANTISSA_BITS);
    assemble(
        BigFloat::from_f64(source, real_bits, targets.real_round),
        exact_zero(imag_bits),
        targets,
    )
}

fn from_native_complex(
    re: f64,
    im: f64,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
) -> BigComplex {
    let real_bits = real.resolve(targets.real_prec, DOUBLE_MANTISSA_BITS);
    let imag_bits = imag.resolve(targets.imag_prec, DOUBLE_MANTISSA_BITS);
    assemble(
        BigFloat::from_f64(re, real_bits, targets.real_round),
        BigFloat::from_f64(im, imag_bits, targets.imag_round),
        targets,
    )
}

fn from_integer(
    source: &IBig,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
) -> BigComplex {
    let real_bits = real.resolve_with_guard(targets.real_prec, targets.guard_bits);
    let imag_bits = imag.resolve_with_guard(targets.imag_prec, targets.guard_bits);
    assemble(
        BigFloat::from_ibig(source, real_bits, targets.real_round),
        exact_zero(imag_bits),
        targets,
    )
}

fn from_rational(
    source: &RBig,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
) -> BigComplex {
    let real_bits = real.resolve_with_guard(targets.real_prec, targets.guard_bits);
    let imag_bits = imag.resolve_with_guard(targets.imag_prec, targets.guard_bits);
    assemble(
        BigFloat::from_rbig(source, real_bits, targets.real_round),
        exact_zero(imag_bits),
        targets,
    )
}

/// A decimal has a single real value. It is converted with the real
/// component's settings; the imaginary component is exact zero.
fn from_decimal(
    source: &DBig,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
) -> BigComplex {
    let real_bits = real.resolve_with_guard(targets.real_prec, targets.guard_bits);
    let imag_bits = imag.resolve_with_guard(targets.imag_prec, targets.guard_bits);
    assemble(
        BigFloat::from_dbig(
            source,
            real_bits,
            targets.real_round,
            targets.emin,
            targets.emax,
        ),
        exact_zero(imag_bits),
        targets,
    )
}

fn from_fraction(
    numerator: &IBig,
    denominator: &IBig,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    targets: &Targets,
) -> Result<BigComplex> {
    if *denominator == IBig::ZERO {
        return Err(Error::Value("fraction with zero denominator".to_string()));
    }
    let numerator = if denominator.sign() == Sign::Negative {
        -numerator.clone()
    } else {
        numerator.clone()
    };
    let rational = RBig::from_parts(numerator, denominator.clone().unsigned_abs());
    Ok(from_rational(&rational, real, imag, targets))
}

/// Convert any supported value to `BigComplex`.
///
/// `real` and `imag` are precision requests: `0` for the context target, `1`
/// to inherit the source's precision, any other value for that many bits.
/// Integer, rational and decimal sources inherit as context target plus
/// guard bits; text sources have nothing to inherit and use the context
/// target.
///
/// The context is read once at entry; only its flags are written. An
/// existing `BigComplex` that already has the resolved precisions is
/// returned as the same `Arc`.
pub fn convert_any(
    value: &Number,
    real: usize,
    imag: usize,
    context: &mut Context,
) -> Result<Arc<BigComplex>> {
    let targets = context.targets();
    let real = PrecisionRequest::from(real);
    let imag = PrecisionRequest::from(imag);
    log::trace!(
        "converting {} to BigComplex ({:?}, {:?})",
        value.kind(),
        real,
        imag
    );

    let assigned = match value {
        Number::Complex(source) => return from_complex(source, real, imag, &targets, context),
        Number::Real(source) => from_real(source, real, imag, &targets),
        Number::Float(source) => from_float(*source, real, imag, &targets),
        Number::NativeComplex(re, im) => from_native_complex(*re, *im, real, imag, &targets),
        Number::Rational(source) => from_rational(source, real, imag, &targets),
        Number::Integer(source) => from_integer(source, real, imag, &targets),
        Number::Decimal(source) => from_decimal(source, real, imag, &targets),
        Number::Fraction(numerator, denominator) => {
            from_fraction(numerator, denominator, real, imag, &targets)?
        }
        Number::Int(source) => from_integer(&IBig::from(*source), real, imag, &targets),
        Number::Text(text) => return parse_requested(text.as_bytes(), 10, real, imag, context),
        Number::Bytes(bytes) => return parse_requested(bytes, 10, real, imag, context),
        Number::Other(name) => {
            return Err(Error::Type(format!(
                "object of type '{}' could not be converted to BigComplex",
                name
            )))
        }
    };
    postprocess(assigned, &targets, context, false).map(Arc::new)
}

/// Convert with context precisions under a default context, reporting any
/// failure as a type error.
pub fn coerce(value: &Number) -> Result<Arc<BigComplex>> {
    let mut context = Context::default();
    convert_any(value, 0, 0, &mut context).map_err(|e| {
        log::debug!("coercion of {} failed: {}", value.kind(), e);
        Error::Type("can't convert argument to BigComplex".to_string())
    })
}
