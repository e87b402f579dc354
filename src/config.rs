//! Configuration management for the lending server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::models::policy::LoanPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// Startup contents of the in-memory library
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LibraryConfig {
    /// Load the built-in demo members and catalog
    #[serde(default)]
    pub seed_demo: bool,
    /// JSON file with members and catalog to load at startup
    #[serde(default)]
    pub seed_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub loans: LoanPolicy,
    #[serde(default)]
    pub library: LibraryConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // LENDING_SERVER__PORT, LENDING_LOANS__BOOK_DURATION_DAYS, ...
            .add_source(
                Environment::with_prefix("LENDING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("library.seed_file", env::var("SEED_FILE").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config
            .loans
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
