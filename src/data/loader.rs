//! RON data loader
//!
//! Loads simulation settings and map definitions from RON files, with
//! fallback to hardcoded defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::MapDefinition;

/// Errors while reading configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Length of the in-game calendar units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub hours_per_day: u32,
    pub days_per_month: u32,
    pub months_per_year: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            hours_per_day: 24,
            days_per_month: 30,
            months_per_year: 12,
        }
    }
}

/// Tuning of the world clock, fast-forwarding and encounters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Game seconds per real second on world maps
    pub world_time_multiplier: u32,
    /// Game seconds per real second on local maps
    pub local_time_multiplier: u32,
    /// Real seconds between two updates of globally owned entities
    pub global_update_interval: f32,
    /// Base real-time step of a fast-forward tick
    pub fast_forward_step: f32,
    /// Percent chance per scouting rank to spot an ambush
    pub scout_chance_per_rank: u32,
    /// How far from the anchor tile ambushers may be placed
    pub encounter_placement_radius: i32,
    pub calendar: CalendarConfig,
    /// Fixed seed for reproducible runs
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_time_multiplier: 1200,
            local_time_multiplier: 60,
            global_update_interval: 0.5,
            fast_forward_step: 0.2,
            scout_chance_per_rank: 10,
            encounter_placement_radius: 4,
            calendar: CalendarConfig::default(),
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse a RON document
    pub fn from_ron(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content, path)
    }

    /// Load from a RON file, falling back to defaults if it is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("{}. Using default simulation settings.", e);
            Self::default()
        })
    }

    /// The larger of the two time multipliers
    pub fn max_time_multiplier(&self) -> u32 {
        self.world_time_multiplier.max(self.local_time_multiplier)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.world_time_multiplier == 0 || self.local_time_multiplier == 0 {
            return Err(ConfigError::Invalid {
                field: "time_multiplier",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.global_update_interval <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "global_update_interval",
                reason: format!("{} is not positive", self.global_update_interval),
            });
        }
        if self.fast_forward_step <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "fast_forward_step",
                reason: format!("{} is not positive", self.fast_forward_step),
            });
        }
        let calendar = &self.calendar;
        if calendar.hours_per_day == 0 || calendar.days_per_month == 0 || calendar.months_per_year == 0 {
            return Err(ConfigError::Invalid {
                field: "calendar",
                reason: "calendar units must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Load map definitions from a RON list
pub fn load_map_definitions(path: impl AsRef<Path>) -> Result<Vec<MapDefinition>, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
