use std::cmp::Ordering;

use arbcomplex_core::{
    convert_any, convert_text, parse_complex, Context, Error, Number, RoundingMode,
};

fn parse(text: &str) -> Result<(f64, f64), Error> {
    let mut ctx = Context::new();
    let z = convert_any(&Number::from(text), 0, 0, &mut ctx)?;
    Ok(z.to_c64(&ctx))
}

// ============================================================================
// Accepted forms
// ============================================================================

#[test]
fn parenthesized_pair() {
    assert_eq!(parse("(1 2j)").unwrap(), (1.0, 2.0));
    assert_eq!(parse("(1 2)").unwrap(), (1.0, 2.0));
    assert_eq!(parse("(-1.5 +2.5j)").unwrap(), (-1.5, 2.5));
}

#[test]
fn host_complex_style() {
    assert_eq!(parse("1+2j").unwrap(), (1.0, 2.0));
    assert_eq!(parse("(1-2j)").unwrap(), (1.0, -2.0));
    assert_eq!(parse("1e3-2.5e-1j").unwrap(), (1000.0, -0.25));
}

#[test]
fn pure_imaginary_and_pure_real() {
    assert_eq!(parse("3j").unwrap(), (0.0, 3.0));
    assert_eq!(parse("(-4j)").unwrap(), (0.0, -4.0));
    assert_eq!(parse("42").unwrap(), (42.0, 0.0));
}

#[test]
fn whitespace_outside_the_literal() {
    assert_eq!(parse("   (1 2j)  ").unwrap(), (1.0, 2.0));
    assert_eq!(parse("\t5\n").unwrap(), (5.0, 0.0));
}

#[test]
fn bytes_are_accepted_like_text() {
    let mut ctx = Context::new();
    let z = convert_any(&Number::Bytes(b"(1 2j)".to_vec()), 0, 0, &mut ctx).unwrap();
    assert_eq!(z.to_c64(&ctx), (1.0, 2.0));
}

#[test]
fn infinities_and_nans() {
    let (re, im) = parse("(inf -inf)").unwrap();
    assert_eq!(re, f64::INFINITY);
    assert_eq!(im, f64::NEG_INFINITY);
    let (re, im) = parse("(nan 1j)").unwrap();
    assert!(re.is_nan());
    assert_eq!(im, 1.0);
}

// ============================================================================
// Rejected forms
// ============================================================================

#[test]
fn mismatched_parentheses() {
    for text in ["(1 2j", "1 2j)", "((1 2j)", "(1 2j))"] {
        assert!(matches!(parse(text), Err(Error::Value(_))), "{}", text);
    }
}

#[test]
fn embedded_nul() {
    assert!(matches!(parse("(1\02j)"), Err(Error::Value(_))));
    assert!(matches!(parse("1\0"), Err(Error::Value(_))));
}

#[test]
fn garbage_and_leftovers() {
    for text in ["", "   ", "abc", "1j2", "1 2 3", "1  2j", "(1 2j) x", "1j 2", "1 2jj"] {
        assert!(matches!(parse(text), Err(Error::Value(_))), "{:?}", text);
    }
}

#[test]
fn non_text_source_is_a_type_error() {
    let mut ctx = Context::new();
    let result = convert_text(&Number::Float(1.0), 10, 0, 0, &mut ctx);
    assert!(matches!(result, Err(Error::Type(_))));
}

// ============================================================================
// Bases and rounding
// ============================================================================

#[test]
fn explicit_base() {
    let mut ctx = Context::new();
    // 'j' is a digit in base 36, so the unit cannot be written there.
    let z = convert_text(&Number::from("(zz -10)"), 36, 0, 0, &mut ctx).unwrap();
    assert_eq!(z.to_c64(&ctx), (1295.0, -36.0));
    let z = parse_complex(b"(0.1 1@1)", 2, 0, 0, &mut ctx).unwrap();
    assert_eq!(z.to_c64(&ctx), (0.5, 2.0));
}

#[test]
fn case_sensitive_digits_above_base_36() {
    let mut ctx = Context::new();
    let z = parse_complex(b"(a A)", 62, 0, 0, &mut ctx).unwrap();
    assert_eq!(z.to_c64(&ctx), (36.0, 10.0));
}

#[test]
fn components_round_with_their_own_modes() {
    let mut ctx = Context::new();
    ctx.precision = 8;
    ctx.real_round = Some(RoundingMode::Down);
    ctx.imag_round = Some(RoundingMode::Up);
    // 257 needs nine bits.
    let z = parse_complex(b"(257 257j)", 10, 0, 0, &mut ctx).unwrap();
    assert_eq!(z.to_c64(&ctx), (256.0, 258.0));
    assert_eq!(z.rc(), (Ordering::Less, Ordering::Greater));
    assert!(ctx.flags.inexact);
}
