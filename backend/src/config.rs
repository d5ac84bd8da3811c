//! Configuration management for the formulation server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SFC_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::DisplayUnit;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Formula defaults applied by the host
    pub formula: FormulaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormulaConfig {
    /// Display unit used when a payload names none (g, oz, lb)
    pub default_unit: String,

    /// Title printed on formula sheets
    pub sheet_title: String,
}

impl FormulaConfig {
    /// Parsed default unit; unknown codes fall back to grams
    pub fn display_unit(&self) -> DisplayUnit {
        DisplayUnit::from_str(&self.default_unit).unwrap_or_default()
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("SFC_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("formula.default_unit", "g")?
            .set_default("formula.sheet_title", shared::engine::export::DEFAULT_SHEET_TITLE)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SFC_ prefix)
            .add_source(
                Environment::with_prefix("SFC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            formula: FormulaConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            default_unit: "g".to_string(),
            sheet_title: shared::engine::export::DEFAULT_SHEET_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_unit_parsing() {
        let mut formula = FormulaConfig::default();
        assert_eq!(formula.display_unit(), DisplayUnit::Gram);

        formula.default_unit = "oz".to_string();
        assert_eq!(formula.display_unit(), DisplayUnit::Ounce);

        formula.default_unit = "furlong".to_string();
        assert_eq!(formula.display_unit(), DisplayUnit::Gram);
    }
}
