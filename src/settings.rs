//! Demo settings with persistence
//!
//! Settings are read from `~/.config/lattice/settings.toml`, or from a path
//! given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use lattice_ecs::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All demo settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub simulation: SimulationSettings,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lattice"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Simulation size and pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Entities spawned at startup
    pub entities: usize,
    /// Ticks before the clock system stops the run
    pub ticks: u64,
    /// Seed for the spawn RNG
    pub seed: u64,
    /// Share of entities that get a velocity (0.0 to 1.0)
    pub moving_ratio: f64,
    /// Longest lifetime, in ticks, handed to an entity; 0 disables expiry
    pub max_lifetime: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            entities: 10_000,
            ticks: 600,
            seed: 42,
            moving_ratio: 0.75,
            max_lifetime: 300,
        }
    }
}
