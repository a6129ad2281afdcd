//! Errors raised by the string-keyed control surface and config loading.
//!
//! Nothing in the frame loop returns these; bad numeric values are clamped
//! instead of rejected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown preset '{name}' (expected vortex, explosion, attractor or wave)")]
    UnknownPreset { name: String },

    #[error("unknown config option '{option}'")]
    UnknownOption { option: String },

    #[error("invalid value '{value}' for config option '{option}'")]
    InvalidValue { option: String, value: String },

    #[error("unknown color mode '{name}' (expected rainbow, energy or mono)")]
    UnknownColorMode { name: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
