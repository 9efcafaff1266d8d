//! Complex literal parsing.
//!
//! ```text
//! [space*] [ "(" ] real [ [" "] imag ] [ "j" | "J" ] [ ")" ] [space*]
//! ```
//!
//! A single literal followed directly by the imaginary unit is a purely
//! imaginary value (`"3j"`). A missing imaginary literal means zero (`"1"`).
//! The parser works on byte offsets into the input and never backtracks
//! further than the separator space.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::bigfloat::BigFloat;
use crate::complex::BigComplex;
use crate::context::{Context, Targets};
use crate::convert::Number;
use crate::error::{Error, Result};
use crate::exceptions::postprocess;
use crate::precision::PrecisionRequest;
use crate::real_literal::{scan, Literal};
use crate::round::RoundingMode;

pub const MIN_BASE: u32 = 2;
pub const MAX_BASE: u32 = 62;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    LeadingSpace,
    OpenParen,
    Real,
    AfterReal,
    Separator,
    Imag,
    ImagUnit,
    CloseParen,
    Trailing,
    Done,
}

/// The two component literals of a complex literal. `None` is an exact
/// zero that did not appear in the text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ComplexLiteral {
    pub real: Option<Literal>,
    pub imag: Option<Literal>,
}

fn is_imaginary_unit(byte: Option<&u8>) -> bool {
    matches!(byte, Some(b'j') | Some(b'J'))
}

fn invalid_literal() -> Error {
    Error::Value("invalid string in BigComplex()".to_string())
}

/// Split a complex literal into its component literals. Returns `None` when
/// the text does not follow the grammar.
pub(crate) fn split_literal(bytes: &[u8], base: u32) -> Option<ComplexLiteral> {
    let mut pos = 0;
    let mut parenthesized = false;
    let mut real = None;
    let mut imag = None;
    // Offset of the separator space, so a missing imaginary literal can give
    // it back to the trailing whitespace.
    let mut separator = None;
    let mut state = State::LeadingSpace;

    while state != State::Done {
        state = match state {
            State::LeadingSpace => {
                while bytes.get(pos).map_or(false, u8::is_ascii_whitespace) {
                    pos += 1;
                }
                State::OpenParen
            }
            State::OpenParen => {
                if bytes.get(pos) == Some(&b'(') {
                    parenthesized = true;
                    pos += 1;
                }
                State::Real
            }
            State::Real => {
                let literal = scan(&bytes[pos..], base)?;
                pos += literal.len;
                real = Some(literal);
                State::AfterReal
            }
            State::AfterReal => {
                if is_imaginary_unit(bytes.get(pos)) {
                    imag = real.take();
                    pos += 1;
                    State::CloseParen
                } else {
                    State::Separator
                }
            }
            State::Separator => {
                if bytes.get(pos) == Some(&b' ') {
                    separator = Some(pos);
                    pos += 1;
                }
                State::Imag
            }
            State::Imag => match scan(&bytes[pos..], base) {
                Some(literal) => {
                    pos += literal.len;
                    imag = Some(literal);
                    State::ImagUnit
                }
                None => {
                    if let Some(start) = separator {
                        pos = start;
                    }
                    State::CloseParen
                }
            },
            State::ImagUnit => {
                if is_imaginary_unit(bytes.get(pos)) {
                    pos += 1;
                }
                State::CloseParen
            }
            State::CloseParen => {
                let closing = bytes.get(pos) == Some(&b')');
                if closing != parenthesized {
                    return None;
                }
                if closing {
                    pos += 1;
                }
                State::Trailing
            }
            State::Trailing => {
                while bytes.get(pos).map_or(false, u8::is_ascii_whitespace) {
                    pos += 1;
                }
                if pos != bytes.len() {
                    return None;
                }
                State::Done
            }
            State::Done => State::Done,
        };
    }

    Some(ComplexLiteral { real, imag })
}

fn validate_base(base: u32) -> Result<()> {
    if !(MIN_BASE..=MAX_BASE).contains(&base) {
        return Err(Error::OutOfRange(format!(
            "base must be in the interval [{}, {}]",
            MIN_BASE, MAX_BASE
        )));
    }
    Ok(())
}

fn validate_text(bytes: &[u8]) -> Result<()> {
    if bytes.contains(&0) {
        return Err(Error::Value(
            "string without NUL characters expected".to_string(),
        ));
    }
    if !bytes.is_ascii() {
        return Err(Error::Value("string contains non-ASCII characters".to_string()));
    }
    Ok(())
}

fn round_component(
    literal: Option<&Literal>,
    base: u32,
    precision_bits: usize,
    round: RoundingMode,
    targets: &Targets,
) -> (BigFloat, Ordering) {
    let (value, ternary) = match literal {
        Some(literal) => literal.round(base, precision_bits, round, targets.emin, targets.emax),
        None => (BigFloat::zero(precision_bits), Ordering::Equal),
    };
    value.check_range(ternary, round, targets.emin, targets.emax)
}

/// Parse a complex literal in `base` (2 to 62).
///
/// Both precision requests `0` and `1` mean the context precision for that
/// component; text has no precision to inherit. NaN results raise the
/// invalid condition.
pub fn parse_complex(
    bytes: &[u8],
    base: u32,
    real: usize,
    imag: usize,
    context: &mut Context,
) -> Result<Arc<BigComplex>> {
    parse_requested(
        bytes,
        base,
        PrecisionRequest::from(real),
        PrecisionRequest::from(imag),
        context,
    )
}

pub(crate) fn parse_requested(
    bytes: &[u8],
    base: u32,
    real: PrecisionRequest,
    imag: PrecisionRequest,
    context: &mut Context,
) -> Result<Arc<BigComplex>> {
    validate_base(base)?;
    validate_text(bytes)?;
    let targets = context.targets();
    let real_bits = real.resolve_from_context(targets.real_prec);
    let imag_bits = imag.resolve_from_context(targets.imag_prec);
    log::trace!(
        "parsing {} byte complex literal in base {} at ({}, {}) bits",
        bytes.len(),
        base,
        real_bits,
        imag_bits
    );

    let literal = split_literal(bytes, base).ok_or_else(invalid_literal)?;

    let (re, rc_re) = round_component(
        literal.real.as_ref(),
        base,
        real_bits,
        targets.real_round,
        &targets,
    );
    let (im, rc_im) = round_component(
        literal.imag.as_ref(),
        base,
        imag_bits,
        targets.imag_round,
        &targets,
    );
    let value = BigComplex::from_components(re, im, (rc_re, rc_im), targets.round2());

    postprocess(value, &targets, context, true).map(Arc::new)
}

/// Parse a text source in an explicit base. Anything other than text or
/// bytes is a type error.
pub fn convert_text(
    value: &Number,
    base: u32,
    real: usize,
    imag: usize,
    context: &mut Context,
) -> Result<Arc<BigComplex>> {
    match value {
        Number::Text(text) => parse_complex(text.as_bytes(), base, real, imag, context),
        Number::Bytes(bytes) => parse_complex(bytes, base, real, imag, context),
        _ => Err(Error::Type("string required".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real_literal::LiteralValue;

    fn split(text: &str) -> Option<(Option<usize>, Option<usize>)> {
        split_literal(text.as_bytes(), 10).map(|lit| {
            (
                lit.real.map(|l| l.len),
                lit.imag.map(|l| l.len),
            )
        })
    }

    fn parse(text: &str) -> Result<(f64, f64)> {
        let mut ctx = Context::new();
        let z = parse_complex(text.as_bytes(), 10, 0, 0, &mut ctx)?;
        Ok(z.to_c64(&ctx))
    }

    #[test]
    fn parenthesized_pair_with_unit() {
        assert_eq!(parse("(1 2j)").unwrap(), (1.0, 2.0));
    }

    #[test]
    fn lone_imaginary_literal() {
        assert_eq!(split("3j"), Some((None, Some(1))));
        assert_eq!(parse("3j").unwrap(), (0.0, 3.0));
        assert_eq!(parse("-2.5J").unwrap(), (0.0, -2.5));
    }

    #[test]
    fn pair_without_unit() {
        assert_eq!(parse("(1 2)").unwrap(), (1.0, 2.0));
    }

    #[test]
    fn signed_imaginary_without_separator() {
        assert_eq!(parse("1+2j").unwrap(), (1.0, 2.0));
        assert_eq!(parse("1-2j").unwrap(), (1.0, -2.0));
    }

    #[test]
    fn real_only_literal_has_zero_imaginary() {
        assert_eq!(split("12"), Some((Some(2), None)));
        assert_eq!(parse(" 12 ").unwrap(), (12.0, 0.0));
        assert_eq!(parse("(7)").unwrap(), (7.0, 0.0));
    }

    #[test]
    fn surrounding_whitespace_is_skipped() {
        assert_eq!(parse("  (1 2j)\t\n").unwrap(), (1.0, 2.0));
    }

    #[test]
    fn mismatched_parentheses_are_rejected() {
        assert!(split("(1 2j").is_none());
        assert!(split("1 2j)").is_none());
        assert!(matches!(parse("(1 2j"), Err(Error::Value(_))));
    }

    #[test]
    fn leftovers_are_rejected() {
        assert!(split("1j 2").is_none());
        assert!(split("1 j").is_none());
        assert!(split("1  2").is_none());
        assert!(split("(1 )").is_none());
        assert!(split("1 2jx").is_none());
        assert!(split("").is_none());
        assert!(split("()").is_none());
        assert!(split("j").is_none());
    }

    #[test]
    fn nul_and_non_ascii_are_value_errors() {
        assert!(matches!(parse("1\02j"), Err(Error::Value(_))));
        assert!(matches!(parse("1\u{00e9}"), Err(Error::Value(_))));
    }

    #[test]
    fn base_outside_range_is_rejected() {
        let mut ctx = Context::new();
        for base in [0, 1, 63] {
            assert!(matches!(
                parse_complex(b"1", base, 0, 0, &mut ctx),
                Err(Error::OutOfRange(_))
            ));
        }
    }

    #[test]
    fn other_bases() {
        let mut ctx = Context::new();
        let z = parse_complex(b"(ff 0x10j)", 16, 0, 0, &mut ctx).unwrap();
        assert_eq!(z.to_c64(&ctx), (255.0, 16.0));
        let z = parse_complex(b"(101 -11)", 2, 0, 0, &mut ctx).unwrap();
        assert_eq!(z.to_c64(&ctx), (5.0, -3.0));
    }

    #[test]
    fn special_values() {
        let lit = split_literal(b"(nan -inf)", 10).unwrap();
        assert_eq!(lit.real.unwrap().value, LiteralValue::Nan);
        assert_eq!(lit.imag.unwrap().value, LiteralValue::Infinity);
    }

    #[test]
    fn nan_pair_raises_invalid() {
        let mut ctx = Context::new();
        let z = parse_complex(b"(nan nan)", 10, 0, 0, &mut ctx).unwrap();
        assert!(z.is_nan());
        assert!(ctx.flags.invalid);

        let mut ctx = Context::new();
        ctx.traps.invalid = true;
        assert!(matches!(
            parse_complex(b"(nan nan)", 10, 0, 0, &mut ctx),
            Err(Error::Invalid)
        ));
    }

    #[test]
    fn inherit_request_means_context_precision() {
        let mut ctx = Context::new();
        ctx.precision = 90;
        ctx.imag_prec = Some(40);
        let z = parse_complex(b"(1 2j)", 10, 1, 1, &mut ctx).unwrap();
        assert_eq!(z.precision_bits(), (90, 40));
        let z = parse_complex(b"(1 2j)", 10, 0, 200, &mut ctx).unwrap();
        assert_eq!(z.precision_bits(), (90, 200));
    }

    #[test]
    fn inexact_component_sets_flag() {
        let mut ctx = Context::new();
        parse_complex(b"(1 0.1j)", 10, 0, 0, &mut ctx).unwrap();
        assert!(ctx.flags.inexact);
        let rc = parse_complex(b"(1 0.5j)", 10, 0, 0, &mut ctx).unwrap().rc();
        assert_eq!(rc, (Ordering::Equal, Ordering::Equal));
    }

    #[test]
    fn non_text_is_type_error() {
        let mut ctx = Context::new();
        assert!(matches!(
            convert_text(&Number::Int(1), 10, 0, 0, &mut ctx),
            Err(Error::Type(_))
        ));
        let z = convert_text(&Number::Bytes(b"(11 1j)".to_vec()), 3, 0, 0, &mut ctx).unwrap();
        assert_eq!(z.to_c64(&ctx), (4.0, 1.0));
    }
}
