//! # Configuration Management Module
//!
//! Tickforge reads a single TOML file that tunes the tick clock, the player's
//! starting resources, the world's land and power pools, console rendering
//! and logging. Every section has defaults, so a missing section or field
//! falls back to the values produced by [`Config::default`].
//!
//! ## Configuration Structure
//!
//! - [`EngineConfig`] - tick period, fatigue cap, RNG seed
//! - [`PlayerConfig`] - stamina pool and passive regeneration
//! - [`WorldConfig`] - land and power pools
//! - [`ConsoleConfig`] - wrapping, colour and history size
//! - [`DataConfig`] - optional seed data directory override
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tickforge::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Tick period: {}ms", config.engine.tick_ms);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [engine]
//! tick_ms = 1000
//! hand_fatigue_ticks = 1800
//!
//! [player]
//! stamina = 50.0
//! max_stamina = 100.0
//! stamina_regen = 1.0
//!
//! [world]
//! land = 10.0
//! power = 0.0
//! max_power = 100.0
//! power_regen = 0.0
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Tick clock and action limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Real-time length of one tick in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Bare-handed gathering stops after this many ticks.
    #[serde(default = "default_hand_fatigue_ticks")]
    pub hand_fatigue_ticks: u32,
    /// Fixed seed for the gather RNG. Unset means seed from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_hand_fatigue_ticks() -> u32 {
    1800
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            hand_fatigue_ticks: default_hand_fatigue_ticks(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub stamina: f64,
    pub max_stamina: f64,
    /// Passive stamina gained per tick while idle.
    pub stamina_regen: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            stamina: 50.0,
            max_stamina: 100.0,
            stamina_regen: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Total land available for devices.
    pub land: f64,
    pub power: f64,
    pub max_power: f64,
    /// Power gained per tick.
    pub power_regen: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            land: 10.0,
            power: 0.0,
            max_power: 100.0,
            power_regen: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Soft wrap column for long output lines (markup excluded).
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
    /// Render markup tags as ANSI styles when stdout is a terminal.
    #[serde(default = "default_color")]
    pub color: bool,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_wrap_width() -> usize {
    100
}

fn default_color() -> bool {
    true
}

fn default_history_size() -> usize {
    100
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            wrap_width: default_wrap_width(),
            color: default_color(),
            history_size: default_history_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    /// Directory holding `items.json`, `recipes.json` and `gathers.json`.
    /// When unset the seed files compiled into the binary are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.engine.tick_ms == 0 {
            return Err(anyhow!("engine.tick_ms must be greater than zero"));
        }
        if self.console.wrap_width < 20 {
            return Err(anyhow!(
                "console.wrap_width must be at least 20 (got {})",
                self.console.wrap_width
            ));
        }
        let amounts = [
            ("player.stamina", self.player.stamina),
            ("player.max_stamina", self.player.max_stamina),
            ("world.land", self.world.land),
            ("world.power", self.world.power),
            ("world.max_power", self.world.max_power),
            ("world.power_regen", self.world.power_regen),
        ];
        for (key, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!("{} must be a non-negative number (got {})", key, value));
            }
        }
        if !self.player.stamina_regen.is_finite() {
            return Err(anyhow!("player.stamina_regen must be finite"));
        }
        if self.player.stamina > self.player.max_stamina {
            return Err(anyhow!("player.stamina cannot exceed player.max_stamina"));
        }
        Ok(())
    }
}
