//! Application configuration loaded from `config.toml`.
//!
//! Every section is optional; missing sections fall back to their defaults so
//! an empty file is a valid configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "TOUR_OPS_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Reference number allocation policy
    #[serde(default)]
    pub reference: ReferencePolicy,
    /// Currencies to seed
    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,
    /// Vehicle types to seed
    #[serde(default)]
    pub vehicle_types: Vec<VehicleTypeConfig>,
}

/// `[database]` section
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL; `DATABASE_URL` overrides it
    pub url: Option<String>,
}

/// `[reference]` section - bounds for reference number allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReferencePolicy {
    /// Highest sequence number tried for one buyer and start date
    pub max_sequence: u32,
    /// How often an insert is retried after losing a uniqueness race
    pub insert_retries: u32,
}

impl Default for ReferencePolicy {
    fn default() -> Self {
        Self {
            max_sequence: 999,
            insert_retries: 3,
        }
    }
}

/// A currency seeded on start-up
#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    /// ISO code, e.g. "EUR"
    pub code: String,
    /// Display name
    pub name: String,
    /// Display symbol
    pub symbol: String,
}

/// A vehicle type seeded on start-up
#[derive(Debug, Deserialize, Clone)]
pub struct VehicleTypeConfig {
    /// Display name, e.g. "Minivan"
    pub name: String,
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is malformed or a value has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `$TOUR_OPS_CONFIG`, or `./config.toml` when unset.
///
/// A missing default file yields the default configuration; a missing file
/// that was named explicitly is an error.
pub fn load_app_configuration() -> Result<AppConfig> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_config(path),
        Err(_) if Path::new("config.toml").exists() => load_config("config.toml"),
        Err(_) => {
            tracing::warn!("No config.toml found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"

            [reference]
            max_sequence = 50
            insert_retries = 5

            [[currencies]]
            code = "EUR"
            name = "Euro"
            symbol = "€"

            [[currencies]]
            code = "TRY"
            name = "Turkish Lira"
            symbol = "₺"

            [[vehicle_types]]
            name = "Minivan"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.reference.max_sequence, 50);
        assert_eq!(config.reference.insert_retries, 5);
        assert_eq!(config.currencies.len(), 2);
        assert_eq!(config.currencies[1].code, "TRY");
        assert_eq!(config.vehicle_types[0].name, "Minivan");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.database.url.is_none());
        assert_eq!(config.reference, ReferencePolicy::default());
        assert!(config.currencies.is_empty());
    }

    #[test]
    fn test_partial_reference_section_keeps_other_default() {
        let config = parse_config("[reference]\nmax_sequence = 10\n").unwrap();
        assert_eq!(config.reference.max_sequence, 10);
        assert_eq!(config.reference.insert_retries, 3);
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let result = parse_config("[reference]\nmax_sequence = \"many\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
