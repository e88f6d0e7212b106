//! # Configuration
//!
//! Optional `rep.toml` read at startup. A missing file means defaults;
//! unknown keys are rejected so typos surface instead of being ignored.
//!
//! ```toml
//! [log]
//! format = "text"      # or "json"
//! filter = "rep=info"
//!
//! [integrity]
//! allow_cycles = false
//! detect_unreachable = false
//!
//! [output]
//! pretty = true
//! validate_on_write = true
//! ```

use rep_core::{IntegrityOptions, RepError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "rep=info";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepConfig {
    pub log: LogConfig,
    pub integrity: IntegrityOptions,
    pub output: OutputConfig,
}

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = RepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(RepError::Decoding(format!(
                "Unknown log format: {}. Use: text, json",
                other
            ))),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Indent JSON graph files.
    pub pretty: bool,
    /// Refuse to write a graph with dangling ports.
    pub validate_on_write: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            validate_on_write: true,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl RepConfig {
    /// Read `path`, or fall back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, RepError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| RepError::Io(format!("Cannot read config metadata: {}", e)))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(RepError::Decoding(format!(
                "Config file {} exceeds maximum allowed {} bytes",
                path.display(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| RepError::Io(format!("Read config '{}': {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, RepError> {
        toml::from_str(text).map_err(|e| RepError::Decoding(format!("Invalid config: {}", e)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
