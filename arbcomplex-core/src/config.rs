//! Named context presets and persisted context loading.
//!
//! Hosts pick a preset by id (for a settings menu, say) or load a full
//! context saved as JSON.

use crate::context::{Context, DEFAULT_EMAX, DEFAULT_EMIN, DEFAULT_PRECISION};
use crate::error::Result;

/// Preset numeric environment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextConfig {
    /// Unique identifier used for lookup
    pub id: &'static str,
    /// Human-readable name for display
    pub display_name: &'static str,
    /// Working precision in bits
    pub precision: usize,
    pub emax: isize,
    pub emin: isize,
    /// Emulate IEEE subnormals near `emin`
    pub subnormalize: bool,
}

impl ContextConfig {
    /// Fresh context with this preset's settings and no flags or traps.
    pub fn to_context(&self) -> Context {
        Context {
            precision: self.precision,
            emax: self.emax,
            emin: self.emin,
            subnormalize: self.subnormalize,
            ..Context::default()
        }
    }
}

/// Registry of available context presets.
pub static CONTEXT_CONFIGS: &[ContextConfig] = &[
    ContextConfig {
        id: "default",
        display_name: "Default (53 bits)",
        precision: DEFAULT_PRECISION,
        emax: DEFAULT_EMAX,
        emin: DEFAULT_EMIN,
        subnormalize: false,
    },
    ContextConfig {
        id: "ieee16",
        display_name: "IEEE 754 binary16",
        precision: 11,
        emax: 16,
        emin: -23,
        subnormalize: true,
    },
    ContextConfig {
        id: "ieee32",
        display_name: "IEEE 754 binary32",
        precision: 24,
        emax: 128,
        emin: -148,
        subnormalize: true,
    },
    ContextConfig {
        id: "ieee64",
        display_name: "IEEE 754 binary64",
        precision: 53,
        emax: 1024,
        emin: -1073,
        subnormalize: true,
    },
    ContextConfig {
        id: "ieee128",
        display_name: "IEEE 754 binary128",
        precision: 113,
        emax: 16384,
        emin: -16493,
        subnormalize: true,
    },
];

/// Look up a context preset by ID.
pub fn get_context_config(id: &str) -> Option<&'static ContextConfig> {
    CONTEXT_CONFIGS.iter().find(|c| c.id == id)
}

/// The preset matching `Context::default()`.
pub fn default_context_config() -> &'static ContextConfig {
    &CONTEXT_CONFIGS[0]
}

/// Load a context saved with `serde_json`. Missing fields take their
/// defaults; the result is validated before it is returned.
pub fn context_from_json(text: &str) -> Result<Context> {
    let context: Context = serde_json::from_str(text)?;
    context.validate()?;
    Ok(context)
}

pub fn context_to_json(context: &Context) -> Result<String> {
    Ok(serde_json::to_string(context)?)
}
