//! # Configuration
//!
//! Optional TOML configuration file (`convalida.toml` by default).
//!
//! ```toml
//! [snapshot]
//! path = "mallas_icoc_snapshot.json"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [log]
//! format = "text"   # or "json"
//! filter = "convalida=info,tower_http=debug"
//! ```
//!
//! Every key is optional. Precedence: CLI flag > environment > file > default.
//!
//! ## Environment Variables
//!
//! - `CONVALIDA_LOG_FORMAT`: `text` or `json`
//! - `CONVALIDA_SNAPSHOT`: working snapshot path

use convalida_core::{ConvalidaError, primitives::SNAPSHOT_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "convalida.toml";

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "convalida=info,tower_http=debug";

// =============================================================================
// SECTIONS
// =============================================================================

/// `[snapshot]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Working snapshot file read and written by CLI commands.
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(SNAPSHOT_FILE_NAME),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse an environment value; anything but `json` is text.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive, used when `RUST_LOG` is not set.
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

// =============================================================================
// CONFIG
// =============================================================================

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub snapshot: SnapshotConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a file, then apply environment overrides.
    ///
    /// - `Some(path)`: the file must exist and parse.
    /// - `None`: `convalida.toml` is read if present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConvalidaError> {
        let config = match path {
            Some(explicit) => Self::from_file(explicit)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Read and parse one TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConvalidaError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConvalidaError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConvalidaError> {
        toml::from_str(text).map_err(|e| ConvalidaError::ConfigError(e.to_string()))
    }

    /// Apply environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(format) = lookup("CONVALIDA_LOG_FORMAT") {
            self.log.format = LogFormat::from_env_value(&format);
        }
        if let Some(path) = lookup("CONVALIDA_SNAPSHOT").filter(|p| !p.is_empty()) {
            self.snapshot.path = PathBuf::from(path);
        }
        self
    }
}
