//! Configuration loading and validation for burrow.
//!
//! Loads `burrow.toml` from the current directory with environment
//! variable overrides, validates at startup, and is then passed by
//! reference to everything that needs it — there is no ambient global
//! client or config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `burrow.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model-access credential. Usually supplied via `GEMINI_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Hard bound on agent rounds per session.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// The directory all tool operations are confined to. Created if
    /// missing, canonicalized once at startup.
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_rounds() -> u32 {
    20
}
fn default_workspace_dir() -> PathBuf {
    PathBuf::from("./workspace")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_rounds", &self.max_rounds)
            .field("workspace_dir", &self.workspace_dir)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `./burrow.toml`, falling back to defaults
    /// when the file is absent, then apply environment overrides:
    /// `GEMINI_API_KEY` for the credential, `BURROW_MODEL` for the model.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("burrow.toml"))?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        if let Ok(model) = std::env::var("BURROW_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "max_rounds must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_rounds: default_max_rounds(),
            workspace_dir: default_workspace_dir(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
