//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the `wtwire` binary)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WtError};
use crate::wire::ProtocolVersion;

/// Default log filter when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main configuration struct
///
/// Every setting is optional so that a source which does not mention a
/// setting never overrides one that does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Codec configuration
    #[serde(default)]
    pub wire: WireConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file location (`<config_dir>/wtwire/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wtwire").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            WtError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Load the default config file if it exists, otherwise defaults
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(pver) = std::env::var("WTWIRE_PROTOCOL_VERSION") {
            if let Ok(pver) = pver.parse() {
                config.wire.protocol_version = Some(pver);
            }
        }

        if let Ok(level) = std::env::var("WTWIRE_LOG_LEVEL") {
            config.logging.level = Some(level);
        }
        if let Ok(json) = std::env::var("WTWIRE_LOG_JSON") {
            config.logging.json = Some(parse_flag(&json));
        }

        config
    }

    /// Merge with another config (other takes precedence where set)
    pub fn merge(self, other: Self) -> Self {
        Self {
            wire: WireConfig {
                protocol_version: other.wire.protocol_version.or(self.wire.protocol_version),
            },
            logging: LoggingConfig {
                level: other.logging.level.or(self.logging.level),
                json: other.logging.json.or(self.logging.json),
            },
        }
    }

    /// Protocol version to use, `0` unless configured
    pub fn protocol_version(&self) -> ProtocolVersion {
        self.wire.protocol_version.unwrap_or_default()
    }

    /// Log filter to use when `RUST_LOG` is unset
    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Whether to emit JSON log lines
    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Codec configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireConfig {
    /// Protocol version passed to every encode/decode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<ProtocolVersion>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Emit JSON log lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}
