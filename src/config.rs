use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub location: LocationDefaults,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Pause between sources, a rate-limiting delay rather than fan-out control
    pub delay_ms: u64,
    pub request_timeout_seconds: u64,
    pub output_path: String,
    /// Local hour (0-23) at which the daily scheduled scrape fires
    pub scrape_hour: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationDefaults {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            delay_ms: 200,
            request_timeout_seconds: 15,
            output_path: "data/events.json".to_string(),
            scrape_hour: 6,
        }
    }
}

impl Default for LocationDefaults {
    fn default() -> Self {
        Self {
            city: "Birmingham".to_string(),
            state: "AL".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Config {
    /// Loads `config.toml`, falling back to built-in defaults when absent.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let mut config = if Path::new(config_path).exists() {
            let config_content = fs::read_to_string(config_path).map_err(|e| {
                ScraperError::Config(format!(
                    "Failed to read config file '{}': {}",
                    config_path, e
                ))
            })?;
            toml::from_str(&config_content)?
        } else {
            Config::default()
        };

        // PORT env var wins over the file, matching common hosting setups
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ScraperError::Config(format!("Invalid PORT value: {}", port)))?;
        }

        Ok(config)
    }
}
