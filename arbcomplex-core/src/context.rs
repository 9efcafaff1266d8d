//! Numeric context: working precision, rounding, exponent range, sticky
//! flags and traps.
//!
//! A context is owned by the caller and borrowed mutably for the length of
//! one conversion. Conversions only ever write its flags. It carries no
//! internal locking; sharing one context between threads needs an external
//! lock.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::round::{Round2, RoundingMode};

/// Default working precision in bits (IEEE 754 binary64 mantissa).
pub const DEFAULT_PRECISION: usize = 53;

/// Default largest exponent, `2^30 - 1`.
pub const DEFAULT_EMAX: isize = (1 << 30) - 1;

/// Default smallest exponent, `-(2^30 - 1)`.
pub const DEFAULT_EMIN: isize = -((1 << 30) - 1);

/// A sticky numeric condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Underflow,
    Overflow,
    Inexact,
    Invalid,
    Erange,
    ExpBound,
}

impl Condition {
    /// Error raised when this condition is trapped.
    pub fn to_error(self) -> Error {
        match self {
            Condition::Underflow => Error::Underflow,
            Condition::Overflow => Error::Overflow,
            Condition::Inexact => Error::Inexact,
            Condition::Invalid => Error::Invalid,
            Condition::Erange => Error::Value("range error in comparison".to_string()),
            Condition::ExpBound => Error::ExponentBound,
        }
    }
}

/// One boolean per condition. Used both for the sticky flags and for the
/// trap mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub inexact: bool,
    pub underflow: bool,
    pub overflow: bool,
    pub invalid: bool,
    pub erange: bool,
    pub expbound: bool,
}

impl Flags {
    /// No condition set.
    pub const NONE: Flags = Flags {
        inexact: false,
        underflow: false,
        overflow: false,
        invalid: false,
        erange: false,
        expbound: false,
    };

    /// Every condition set.
    pub const ALL: Flags = Flags {
        inexact: true,
        underflow: true,
        overflow: true,
        invalid: true,
        erange: true,
        expbound: true,
    };

    pub fn contains(&self, condition: Condition) -> bool {
        match condition {
            Condition::Underflow => self.underflow,
            Condition::Overflow => self.overflow,
            Condition::Inexact => self.inexact,
            Condition::Invalid => self.invalid,
            Condition::Erange => self.erange,
            Condition::ExpBound => self.expbound,
        }
    }

    pub fn set(&mut self, condition: Condition) {
        match condition {
            Condition::Underflow => self.underflow = true,
            Condition::Overflow => self.overflow = true,
            Condition::Inexact => self.inexact = true,
            Condition::Invalid => self.invalid = true,
            Condition::Erange => self.erange = true,
            Condition::ExpBound => self.expbound = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Flags::NONE
    }
}

/// The part of a context a conversion reads, captured once at entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Targets {
    pub real_prec: usize,
    pub imag_prec: usize,
    pub real_round: RoundingMode,
    pub imag_round: RoundingMode,
    pub guard_bits: usize,
    pub emin: isize,
    pub emax: isize,
    pub subnormalize: bool,
}

impl Targets {
    pub fn round2(&self) -> Round2 {
        (self.real_round, self.imag_round)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    /// Working precision in bits.
    pub precision: usize,
    /// Real component precision; `None` follows `precision`.
    pub real_prec: Option<usize>,
    /// Imaginary component precision; `None` follows `precision`.
    pub imag_prec: Option<usize>,
    pub round: RoundingMode,
    /// Real component rounding; `None` follows `round`.
    pub real_round: Option<RoundingMode>,
    /// Imaginary component rounding; `None` follows `round`.
    pub imag_round: Option<RoundingMode>,
    /// Extra bits granted to integer and rational sources.
    pub guard_bits: usize,
    pub emax: isize,
    pub emin: isize,
    /// Emulate subnormal numbers near `emin`.
    pub subnormalize: bool,
    /// Sticky flags, set by conversions and cleared only by the caller.
    pub flags: Flags,
    /// Conditions that fail a conversion instead of only setting a flag.
    pub traps: Flags,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            real_prec: None,
            imag_prec: None,
            round: RoundingMode::Nearest,
            real_round: None,
            imag_round: None,
            guard_bits: 0,
            emax: DEFAULT_EMAX,
            emin: DEFAULT_EMIN,
            subnormalize: false,
            flags: Flags::NONE,
            traps: Flags::NONE,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context emulating an IEEE 754 binary interchange format of `bits`
    /// width: 16, 32, 64, 128, or any multiple of 32 above 128.
    pub fn ieee(bits: usize) -> Result<Self> {
        let (precision, emax): (usize, isize) = match bits {
            16 => (11, 16),
            32 => (24, 128),
            64 => (53, 1024),
            128 => (113, 16384),
            b if b > 128 && b % 32 == 0 => {
                let exponent_bits = libm::round(4.0 * libm::log2(b as f64)) as usize;
                let precision = b - exponent_bits + 13;
                let shift = b - precision - 1;
                if shift >= isize::BITS as usize - 2 {
                    return Err(Error::Value(format!(
                        "bit width {} exceeds the supported exponent range",
                        bits
                    )));
                }
                (precision, 1isize << shift)
            }
            _ => {
                return Err(Error::Value(
                    "bit width must be 16, 32, 64, 128, or a multiple of 32 above 128"
                        .to_string(),
                ))
            }
        };
        Ok(Self {
            precision,
            emax,
            emin: 4 - emax - precision as isize,
            subnormalize: true,
            ..Self::default()
        })
    }

    pub fn real_precision(&self) -> usize {
        self.real_prec.unwrap_or(self.precision)
    }

    pub fn imag_precision(&self) -> usize {
        self.imag_prec.unwrap_or(self.precision)
    }

    pub fn real_round(&self) -> RoundingMode {
        self.real_round.unwrap_or(self.round)
    }

    pub fn imag_round(&self) -> RoundingMode {
        self.imag_round.unwrap_or(self.round)
    }

    pub fn round2(&self) -> Round2 {
        (self.real_round(), self.imag_round())
    }

    pub fn clear_flags(&mut self) {
        self.flags = Flags::NONE;
    }

    /// Snapshot of the settings a conversion reads.
    pub fn targets(&self) -> Targets {
        Targets {
            real_prec: self.real_precision(),
            imag_prec: self.imag_precision(),
            real_round: self.real_round(),
            imag_round: self.imag_round(),
            guard_bits: self.guard_bits,
            emin: self.emin,
            emax: self.emax,
            subnormalize: self.subnormalize,
        }
    }

    /// Record `condition` in the sticky flags, failing if it is trapped.
    pub fn signal(&mut self, condition: Condition) -> Result<()> {
        self.flags.set(condition);
        if self.traps.contains(condition) {
            log::debug!("trapped {:?} during BigComplex conversion", condition);
            return Err(condition.to_error());
        }
        Ok(())
    }

    /// Check that the settings describe a usable context.
    pub fn validate(&self) -> Result<()> {
        let precisions = [
            Some(self.precision),
            self.real_prec,
            self.imag_prec,
        ];
        if precisions.iter().flatten().any(|p| *p == 0) {
            return Err(Error::Value("precision must be at least 1".to_string()));
        }
        if self.emin >= self.emax {
            return Err(Error::Value("emin must be less than emax".to_string()));
        }
        Ok(())
    }
}
