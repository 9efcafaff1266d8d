pub mod bigfloat;
pub mod complex;
pub mod config;
pub mod context;
pub mod convert;
pub mod digits;
pub mod error;
mod exceptions;
pub mod precision;
mod real_literal;
pub mod round;
pub mod serialize;
pub mod text;

pub use bigfloat::{BigFloat, BigFloatValue, DOUBLE_MANTISSA_BITS};
pub use complex::BigComplex;
pub use config::{
    context_from_json, context_to_json, default_context_config, get_context_config, ContextConfig,
    CONTEXT_CONFIGS,
};
pub use context::{Condition, Context, Flags, Targets};
pub use convert::{coerce, convert_any, Number};
pub use digits::{round_trip_digits, to_digits};
pub use error::{Error, Result};
pub use precision::PrecisionRequest;
pub use round::{pack_inex, unpack_inex, Ordering2, Round2, RoundingMode};
pub use serialize::{format_general, significant_digits, to_text, ComplexText, ComponentText};
pub use text::{convert_text, parse_complex};
