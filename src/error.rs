//! Crate-level error types.
//!
//! Codec failures are [`WireError`]s and keep their full chain via
//! `#[source]`. The remaining variants belong to the outer surfaces: config
//! loading and the `wtwire` binary, whose commands all return [`Result`].

use thiserror::Error;

use crate::wire::WireError;

/// wtwire errors.
#[derive(Error, Debug)]
pub enum WtError {
    /// Wire codec failure.
    #[error("Wire error: {0}")]
    Wire(#[source] WireError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Input could not be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for wtwire operations
pub type Result<T> = std::result::Result<T, WtError>;

impl From<WireError> for WtError {
    fn from(err: WireError) -> Self {
        WtError::Wire(err)
    }
}

impl From<toml::de::Error> for WtError {
    fn from(err: toml::de::Error) -> Self {
        WtError::Config(err.to_string())
    }
}

impl From<base64::DecodeError> for WtError {
    fn from(err: base64::DecodeError) -> Self {
        WtError::InvalidInput(format!("Base64 decode error: {err}"))
    }
}
