//! Exception handling shared by every conversion.
//!
//! A converter produces a complex value plus ternary codes. This module
//! renormalizes it, works out which sticky conditions it raised, records them
//! in the context in a fixed order and turns the first trapped one into an
//! error. The value is dropped when a trap fires, so no partial result
//! escapes.

use std::cmp::Ordering;

use crate::complex::BigComplex;
use crate::context::{Condition, Context, Flags, Targets};
use crate::error::Result;

/// Order in which conditions are recorded and trapped.
const CONDITION_ORDER: [Condition; 4] = [
    Condition::Underflow,
    Condition::Overflow,
    Condition::Inexact,
    Condition::Invalid,
];

/// Apply subnormal emulation to both components when the context asks for
/// it.
pub(crate) fn subnormalize(value: BigComplex, targets: &Targets) -> BigComplex {
    if !targets.subnormalize {
        return value;
    }
    let (re, im, (rc_re, rc_im), round) = value.into_components();
    let (re, rc_re) = re.subnormalize(rc_re, round.0, targets.emin);
    let (im, rc_im) = im.subnormalize(rc_im, round.1, targets.emin);
    BigComplex::from_components(re, im, (rc_re, rc_im), round)
}

/// Conditions raised by a freshly assigned value.
///
/// Underflow: a component was rounded to zero. Overflow: a component was
/// rounded to infinity. Inexact: any component was rounded. Invalid (only
/// when `check_invalid`): the value is NaN.
pub(crate) fn assess(value: &BigComplex, check_invalid: bool) -> Flags {
    let (rc_re, rc_im) = value.rc();
    let rounded_re = rc_re != Ordering::Equal;
    let rounded_im = rc_im != Ordering::Equal;

    let mut raised = Flags::NONE;
    if (rounded_re && value.real().is_zero()) || (rounded_im && value.imag().is_zero()) {
        raised.set(Condition::Underflow);
    }
    if (rounded_re && value.real().is_infinite()) || (rounded_im && value.imag().is_infinite()) {
        raised.set(Condition::Overflow);
    }
    if rounded_re || rounded_im {
        raised.set(Condition::Inexact);
    }
    if check_invalid && value.is_nan() {
        raised.set(Condition::Invalid);
    }
    raised
}

/// Finish a conversion: renormalize, record flags, enforce traps.
pub(crate) fn postprocess(
    value: BigComplex,
    targets: &Targets,
    context: &mut Context,
    check_invalid: bool,
) -> Result<BigComplex> {
    let value = subnormalize(value, targets);
    let raised = assess(&value, check_invalid);
    for condition in CONDITION_ORDER {
        if raised.contains(condition) {
            context.signal(condition)?;
        }
    }
    Ok(value)
}
