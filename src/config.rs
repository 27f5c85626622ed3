//! Engine configuration

use crate::audit::DEFAULT_AUDIT_CATEGORY;
use crate::error::{ManualFxError, Result};
use crate::types::DEFAULT_RATE_DECIMAL_PLACES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest scale a `rust_decimal::Decimal` can hold
const MAX_DECIMAL_PLACES: u32 = 28;

/// Configuration for the rate engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decimal places kept when a manual rate is stored
    pub rate_decimal_places: u32,
    /// Send a rate-applied notification on confirmation/posting
    pub notify_on_confirm: bool,
    /// Category passed to the message log
    pub audit_category: String,
    /// Let the in-memory rate table answer B/A from a stored A/B rate
    pub inverse_lookup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rate_decimal_places: DEFAULT_RATE_DECIMAL_PLACES,
            notify_on_confirm: true,
            audit_category: DEFAULT_AUDIT_CATEGORY.to_string(),
            inverse_lookup: true,
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML document; missing keys take their defaults
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        log::debug!("Loading engine config from {}", path.as_ref().display());
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_decimal_places > MAX_DECIMAL_PLACES {
            return Err(ManualFxError::ConfigError(format!(
                "rate_decimal_places must be at most {}, got {}",
                MAX_DECIMAL_PLACES, self.rate_decimal_places
            )));
        }
        if self.audit_category.trim().is_empty() {
            return Err(ManualFxError::ConfigError(
                "audit_category must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.rate_decimal_places, 6);
        assert!(config.notify_on_confirm);
        assert_eq!(config.audit_category, "currency_rate");
        assert!(config.inverse_lookup);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str("rate_decimal_places = 4\n").unwrap();
        assert_eq!(config.rate_decimal_places, 4);
        assert!(config.notify_on_confirm);
    }

    #[test]
    fn test_invalid_values() {
        let err = EngineConfig::from_toml_str("rate_decimal_places = 40\n").unwrap_err();
        assert!(matches!(err, ManualFxError::ConfigError(_)));

        let err = EngineConfig::from_toml_str("audit_category = \"  \"\n").unwrap_err();
        assert!(matches!(err, ManualFxError::ConfigError(_)));

        let err = EngineConfig::from_toml_str("notify_on_confirm = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ManualFxError::TomlError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "notify_on_confirm = false").unwrap();
        writeln!(file, "audit_category = \"fx\"").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!(!config.notify_on_confirm);
        assert_eq!(config.audit_category, "fx");
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/manual_fx.toml").unwrap_err();
        assert!(matches!(err, ManualFxError::IoError(_)));
    }
}
