//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::types::{LineItemConfig, LineItemSettings, PayrollConfig, PayrollSettings};

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// validates them into a [`PayrollConfig`].
///
/// # Directory Structure
///
/// ```text
/// config/fi_se/
/// ├── payroll.yaml     # Currency, tax, insurance and contribution rates
/// └── line_items.yaml  # Line-item codes, benefits and classification prefixes
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/fi_se").unwrap();
/// println!("Secondary threshold: {}", loader.config().secondary().threshold);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any value fails validation (negative rates, non-positive currency rate, ...)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/fi_se")?;
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<PayrollSettings>(&path.join("payroll.yaml"))?;
        let line_items = Self::load_yaml::<LineItemSettings>(&path.join("line_items.yaml"))?;

        let config = PayrollConfig::new(settings, line_items).map_err(|e| match e {
            EngineError::ConfigParseError { .. } | EngineError::ConfigNotFound { .. } => e,
            other => EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: other.to_string(),
            },
        })?;

        info!(
            path = %path.display(),
            line_items = config.line_items().len(),
            primary = %config.primary().jurisdiction,
            secondary = %config.secondary().jurisdiction,
            "Loaded payroll configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();
        debug!(path = %path_str, "Reading configuration file");

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }

    /// Gets a configured salary line item by code.
    pub fn get_line_item(&self, code: &str) -> EngineResult<&LineItemConfig> {
        self.config
            .line_item(code)
            .ok_or_else(|| EngineError::invalid_input("line_item.code", format!("unknown code '{}'", code)))
    }

    /// Gets the unit rate of a line item for a given base hourly rate.
    pub fn get_unit_rate(&self, code: &str, base_hourly_rate: Decimal) -> EngineResult<Decimal> {
        Ok(self.get_line_item(code)?.rate.resolve(base_hourly_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DoubleTaxationPolicy;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/fi_se"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.config().currency().primary, "EUR");
        assert_eq!(loader.config().currency().secondary, "SEK");
        assert_eq!(loader.config().currency().rate, dec("0.086"));
    }

    #[test]
    fn test_loaded_configuration_matches_default() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.into_config(), PayrollConfig::default());
    }

    #[test]
    fn test_tax_rates_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let config = loader.config();

        assert_eq!(config.primary().base_rate, dec("0.165"));
        assert_eq!(config.primary().additional_rate, dec("0.44"));
        assert_eq!(config.primary().annual_income_limit, dec("39800.00"));
        assert_eq!(config.primary().double_taxation, DoubleTaxationPolicy::Waive);
        assert_eq!(config.secondary().threshold, dec("833.00"));
        assert_eq!(config.secondary().standard_allowance_deduction, dec("217.78"));
    }

    #[test]
    fn test_get_unit_rate() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(loader.get_unit_rate("12102", dec("17.00")).unwrap(), dec("8.50"));
        assert_eq!(loader.get_unit_rate("12107", dec("17.00")).unwrap(), dec("1.41"));
    }

    #[test]
    fn test_get_unknown_line_item_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_line_item("99999") {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "line_item.code"),
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("payroll.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
