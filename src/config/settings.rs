//! Application settings loading from config.toml
//!
//! Settings are optional: when the default file is absent every value falls back to
//! its default. A file that exists but cannot be parsed is an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Settings {
    /// Report and dashboard presentation
    pub report: ReportSettings,
    /// Discord bot behaviour
    pub bot: BotSettings,
}

/// `[report]` table
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportSettings {
    /// Name printed at the top of exported documents
    pub title: String,
    /// How many students the dashboard leaderboard shows
    pub top_students: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Managea".to_string(),
            top_students: 5,
        }
    }
}

/// `[bot]` table
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BotSettings {
    /// Register commands in this guild only (faster updates during development)
    pub dev_guild_id: Option<u64>,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Attempting to load configuration from: {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads settings from `MANAGEA_CONFIG` or `./config.toml`.
///
/// Falls back to defaults when the file does not exist.
pub fn load_default_config() -> Result<Settings> {
    let path = std::env::var("MANAGEA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        info!("No configuration file at {path}; using defaults.");
        return Ok(Settings::default());
    }
    load_config(path)
}
