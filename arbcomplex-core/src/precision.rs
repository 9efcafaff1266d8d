//! Precision requests and their resolution.
//!
//! A request is `0` (use the context target), `1` (inherit from the source)
//! or any other value (that many bits). What "inherit" means depends on the
//! source kind, so converters pick the matching resolution rule.

/// Precision asked for one component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrecisionRequest {
    /// The context's target precision for the component.
    Context,
    /// The source value's own precision.
    Source,
    /// Exactly this many bits.
    Bits(usize),
}

impl From<usize> for PrecisionRequest {
    fn from(value: usize) -> Self {
        match value {
            0 => PrecisionRequest::Context,
            1 => PrecisionRequest::Source,
            bits => PrecisionRequest::Bits(bits),
        }
    }
}

impl PrecisionRequest {
    /// Resolve for a source that carries a precision (or a fixed native
    /// width).
    pub fn resolve(self, context_bits: usize, source_bits: usize) -> usize {
        match self {
            PrecisionRequest::Context => context_bits,
            PrecisionRequest::Source => source_bits,
            PrecisionRequest::Bits(bits) => bits,
        }
    }

    /// Resolve for integer and rational sources, which are exact and have no
    /// binary precision: inheriting grants the guard bits on top of the
    /// context target.
    pub fn resolve_with_guard(self, context_bits: usize, guard_bits: usize) -> usize {
        match self {
            PrecisionRequest::Context => context_bits,
            PrecisionRequest::Source => context_bits + guard_bits,
            PrecisionRequest::Bits(bits) => bits,
        }
    }

    /// Resolve for sources with nothing to inherit (text).
    pub fn resolve_from_context(self, context_bits: usize) -> usize {
        match self {
            PrecisionRequest::Context | PrecisionRequest::Source => context_bits,
            PrecisionRequest::Bits(bits) => bits,
        }
    }
}
