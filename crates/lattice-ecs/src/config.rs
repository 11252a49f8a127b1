use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::EntityStore;

/// Errors that can occur while loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read engine config '{}': {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse engine config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine tuning. Every field has a default, so a config file only needs the
/// keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on ticks per `Engine::run` call. `None` runs until a
    /// system signals stop.
    pub max_ticks: Option<u64>,
    /// Initial entity capacity for stores built with [`build_store`](Self::build_store).
    pub store_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_ticks: None,
            store_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&text)
    }

    /// Render the config as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// An empty store pre-sized to `store_capacity`.
    pub fn build_store(&self) -> EntityStore {
        EntityStore::with_capacity(self.store_capacity)
    }
}
