//! Movement type seed configuration loaded from config.toml
//!
//! The movement types listed in config.toml are inserted on startup when their
//! `type_code` is not in the database yet. Without a config file the standard
//! IN / OUT / ADJUSTMENT / TRANSFER set is used.

use crate::entities::movement_type::Effect;
use crate::errors::{Error, Result};
use sea_orm::ActiveEnum;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Movement types to seed
    pub movement_types: Vec<MovementTypeConfig>,
}

/// Configuration for a single movement type
#[derive(Debug, Deserialize, Clone)]
pub struct MovementTypeConfig {
    /// Short stable code (e.g., `IN`)
    pub type_code: String,
    /// Human-readable name
    pub type_name: String,
    /// Effect as stored: `1`, `-1` or `0`
    pub effect: i32,
    /// Whether the type is offered for new movements
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl MovementTypeConfig {
    /// Converts the numeric effect into an [`Effect`].
    pub fn effect(&self) -> Result<Effect> {
        Effect::try_from_value(&self.effect).map_err(|_| Error::Config {
            message: format!(
                "Movement type '{}' has effect {}; expected 1, -1 or 0",
                self.type_code, self.effect
            ),
        })
    }
}

/// Loads movement type configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads movement types from `path`, or the built-in defaults when the file does not exist.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Vec<MovementTypeConfig>> {
    if path.as_ref().exists() {
        Ok(load_config(path)?.movement_types)
    } else {
        tracing::info!(
            "No movement type config at {:?}; using built-in defaults",
            path.as_ref()
        );
        Ok(default_movement_types())
    }
}

/// The standard movement types.
#[must_use]
pub fn default_movement_types() -> Vec<MovementTypeConfig> {
    [
        ("IN", "Stock in", 1),
        ("OUT", "Stock out", -1),
        ("ADJUSTMENT", "Stock adjustment", 0),
        ("TRANSFER", "Transfer", -1),
    ]
    .into_iter()
    .map(|(code, name, effect)| MovementTypeConfig {
        type_code: code.to_string(),
        type_name: name.to_string(),
        effect,
        is_active: true,
    })
    .collect()
}
