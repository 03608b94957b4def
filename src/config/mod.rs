//! Configuration management.
//!
//! Emberward reads one TOML file (default `config.toml`) covering the game
//! identity, the world clock's starting state, the seed-data location, and
//! logging. All values have sensible defaults and are validated on load;
//! CLI flags override the file where they overlap.
//!
//! ```toml
//! [game]
//! name = "Emberward"
//! tick_seconds = 1.0
//!
//! [world]
//! start_hour = 12
//! time_scale = 60.0
//!
//! [seeds]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "emberward.log"
//! events_file = "game-events.log"
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::world::WorldClock;

/// Game identity and loop cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub name: String,
    pub description: String,
    /// Real seconds between simulation ticks.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
}

fn default_tick_seconds() -> f64 {
    1.0
}

/// Starting state of the world clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,
    #[serde(default)]
    pub start_minute: u8,
    #[serde(default = "default_start_day")]
    pub start_day: u32,
    /// Real-seconds-to-game-minutes multiplier. At 60.0, one real second is
    /// one game minute.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

fn default_start_hour() -> u8 {
    12
}

fn default_start_day() -> u32 {
    1
}

fn default_time_scale() -> f64 {
    1.0
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            start_minute: 0,
            start_day: default_start_day(),
            time_scale: default_time_scale(),
        }
    }
}

impl WorldConfig {
    /// The clock this configuration describes.
    pub fn clock(&self) -> WorldClock {
        WorldClock::new(
            self.start_hour,
            self.start_minute,
            self.start_day,
            self.time_scale,
        )
    }
}

/// Where seed data lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub data_dir: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn items_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("items")
    }

    pub fn characters_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("characters")
    }
}

/// Logging sinks. `events_file` receives only records logged under the
/// `events` target (the structured game-event lines).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default)]
    pub events_file: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.start_hour > 23 {
            return Err(anyhow!("world.start_hour must be 0-23"));
        }
        if self.world.start_minute > 59 {
            return Err(anyhow!("world.start_minute must be 0-59"));
        }
        if self.world.start_day == 0 {
            return Err(anyhow!("world.start_day must be at least 1"));
        }
        if self.world.time_scale <= 0.0 {
            return Err(anyhow!("world.time_scale must be positive"));
        }
        if self.game.tick_seconds <= 0.0 {
            return Err(anyhow!("game.tick_seconds must be positive"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: GameConfig {
                name: "Emberward".to_string(),
                description: "A small persistent game world".to_string(),
                tick_seconds: default_tick_seconds(),
            },
            world: WorldConfig::default(),
            seeds: SeedConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("emberward.log".to_string()),
                events_file: Some("game-events.log".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.start_hour, 12);
        assert_eq!(config.world.clock().display(), "Day 1, 12:00");
    }

    #[test]
    fn validation_rejects_out_of_range_clock_values() {
        let mut config = Config::default();
        config.world.start_hour = 24;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.world.time_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.world.start_day = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
            [game]
            name = "Testworld"
            description = "test"

            [logging]
            level = "debug"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.tick_seconds, 1.0);
        assert_eq!(config.world.time_scale, 1.0);
        assert_eq!(config.seeds.data_dir, "./data");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn seed_dirs_derive_from_data_dir() {
        let seeds = SeedConfig {
            data_dir: "/tmp/worlds/alpha".to_string(),
        };
        assert!(seeds.items_dir().ends_with("items"));
        assert!(seeds.characters_dir().ends_with("characters"));
    }
}
