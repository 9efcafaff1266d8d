//! Error taxonomy for conversions into `BigComplex`.

use thiserror::Error;

/// Every way a conversion, parse or format request can fail.
///
/// Sticky numeric conditions (`Underflow`, `Overflow`, `Inexact`, `Invalid`)
/// only surface here when the context traps them; otherwise they are recorded
/// in the context flags and the conversion succeeds.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not one of the recognized source kinds.
    #[error("{0}")]
    Type(String),

    /// The input is well typed but structurally invalid.
    #[error("{0}")]
    Value(String),

    /// A numeric parameter (base, digit count) lies outside its domain.
    #[error("{0}")]
    OutOfRange(String),

    /// A source component exponent lies outside the context exponent range.
    #[error("exponent of existing BigComplex incompatible with current context")]
    ExponentBound,

    #[error("BigComplex underflow")]
    Underflow,

    #[error("BigComplex overflow")]
    Overflow,

    #[error("BigComplex inexact result")]
    Inexact,

    #[error("BigComplex invalid operation")]
    Invalid,

    /// A persisted context could not be decoded.
    #[error("invalid context configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
