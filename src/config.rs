use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::DEFAULT_MAX_HANDS;

/// Tracker settings. Every field has a default, so a config file only
/// needs the keys it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Closed hands kept per session before the oldest are evicted.
    pub max_hands: usize,
    /// How many recent hands are summarised for the decision model.
    pub summary_hands: usize,
    /// Name the automation layer uses for the hero seat.
    pub hero_name: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_hands: DEFAULT_MAX_HANDS,
            summary_hands: 5,
            hero_name: "Hero".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Defaults overlaid with the JSON file at `path`, if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str::<TrackerConfig>(&raw)?
            }
            _ => TrackerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hands == 0 {
            return Err(ConfigError::Invalid("max_hands must be at least 1".into()));
        }
        if self.hero_name.trim().is_empty() {
            return Err(ConfigError::Invalid("hero_name must not be empty".into()));
        }
        Ok(())
    }
}
