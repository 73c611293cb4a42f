//! Engine configuration
//!
//! Loaded from a TOML file and overridden by environment variables:
//!
//! ```toml
//! global_flags = 1024
//! allocation_step = 64
//! resource_path = "/opt/game/resources"
//! logic_scope = "closest"
//! early_exit = true
//! ```
//!
//! | variable | field |
//! |---|---|
//! | `TESSERA_RESOURCE_PATH` | `resource_path` |
//! | `TESSERA_GLOBAL_FLAGS` | `global_flags` |
//! | `TESSERA_ALLOCATION_STEP` | `allocation_step` |

use crate::ResourcePaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding the resource root
pub const ENV_RESOURCE_PATH: &str = "TESSERA_RESOURCE_PATH";
/// Environment variable overriding the number of global flags
pub const ENV_GLOBAL_FLAGS: &str = "TESSERA_GLOBAL_FLAGS";
/// Environment variable overriding the allocation step
pub const ENV_ALLOCATION_STEP: &str = "TESSERA_ALLOCATION_STEP";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`EngineConfig`]
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment variable holds an unusable value
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    /// Configuration is well-formed but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which maps run their rules each tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicScope {
    /// Only the map the player is on
    #[default]
    Current,
    /// The current map and its nearest neighbours
    Closest,
    /// Every loaded map
    All,
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Flags below this ID are global and persist across maps
    pub global_flags: u16,
    /// Growth step for pools and the action table
    pub allocation_step: usize,
    /// Resource root; the platform data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<PathBuf>,
    pub logic_scope: LogicScope,
    /// Stop reading rule operands once the result is known
    pub early_exit: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            global_flags: 1024,
            allocation_step: 64,
            resource_path: None,
            logic_scope: LogicScope::Current,
            early_exit: true,
        }
    }
}

impl EngineConfig {
    /// Load a configuration file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?.with_env()?;
        debug!(path = %path.display(), ?config, "Loaded engine configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_RESOURCE_PATH).filter(|p| !p.is_empty()) {
            self.resource_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(ENV_GLOBAL_FLAGS) {
            self.global_flags = parse_var(ENV_GLOBAL_FLAGS, value)?;
        }
        if let Some(value) = lookup(ENV_ALLOCATION_STEP) {
            self.allocation_step = parse_var(ENV_ALLOCATION_STEP, value)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allocation_step == 0 {
            return Err(ConfigError::Invalid("allocation_step must be > 0".into()));
        }
        Ok(())
    }

    /// Path resolver for the configured resource root
    pub fn paths(&self) -> ResourcePaths {
        match &self.resource_path {
            Some(root) => ResourcePaths::new(root),
            None => ResourcePaths::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
