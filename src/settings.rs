//! # Settings Module
//!
//! ## Purpose
//! Run-time configuration of the rate engine: initial temperature of new reaction systems,
//! constants of the equilibrium model, state revalidation toggle, registry aliases and log level.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "default_temperature": 273.0,
//!   "reference_pressure": 100000.0,
//!   "gas_constant": 8.3144598,
//!   "check_state": true,
//!   "law_aliases": false,
//!   "log_level": "info"
//! }
//! ```
//! Missing keys take their default value. A missing or unreadable file gives the default
//! configuration. There is no global instance: the configuration is handed to the code that needs it.
//!
//! ## Usage Pattern
//! ```rust, ignore
//! use KiRates::settings::KineticsConfig;
//!
//! let config = KineticsConfig::load_config("kirates_config.json");
//! let registry = config.registry();
//! ```

use crate::Kinetics::law_registry::LawRegistry;
use crate::Thermodynamics::ChemEquilibrium::BackwardLaw::{P0, R_GAS};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "kirates_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticsConfig {
    /// initial temperature of a reaction system, K
    pub default_temperature: f64,
    /// reference pressure of the equilibrium constants, Pa
    pub reference_pressure: f64,
    pub gas_constant: f64,
    /// revalidate the state on every rate-coefficient evaluation
    pub check_state: bool,
    /// also register "constant", "arrhenius", "modified_arrhenius" and "ModifiedArrhenius"
    pub law_aliases: bool,
    /// one of off, error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for KineticsConfig {
    fn default() -> Self {
        Self {
            default_temperature: 273.0,
            reference_pressure: P0,
            gas_constant: R_GAS,
            check_state: true,
            law_aliases: false,
            log_level: "info".to_string(),
        }
    }
}

impl KineticsConfig {
    /// Reads the configuration from a JSON file, falls back to defaults if there is none
    /// or it cannot be parsed.
    pub fn load_config(config_file: &str) -> Self {
        Self::try_load(config_file).unwrap_or_else(|e| {
            warn!(
                "config file '{}' could not be read ({}), using defaults",
                config_file, e
            );
            Self::default()
        })
    }

    fn try_load(config_file: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: KineticsConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_config(&self, config_file: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_file, content)?;
        Ok(())
    }

    /// registry with the built-in laws, aliases included if configured
    pub fn registry(&self) -> LawRegistry {
        if self.law_aliases {
            LawRegistry::with_aliases()
        } else {
            LawRegistry::new()
        }
    }

    /// unknown level names give `Info`
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = KineticsConfig::default();
        assert_eq!(config.default_temperature, 273.0);
        assert_eq!(config.reference_pressure, 1.0e5);
        assert_eq!(config.gas_constant, 8.3144598);
        assert!(config.check_state);
        assert_eq!(config.level_filter(), LevelFilter::Info);
        assert!(!config.registry().contains("arrhenius"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = KineticsConfig::load_config("no_such_kirates_config.json");
        assert_eq!(config, KineticsConfig::default());
    }

    #[test]
    fn test_partial_and_invalid_files() {
        let mut temp_config = NamedTempFile::new().unwrap();
        write!(
            temp_config,
            r#"{{"default_temperature": 1000.0, "law_aliases": true, "log_level": "debug"}}"#
        )
        .unwrap();
        let config = KineticsConfig::load_config(temp_config.path().to_str().unwrap());
        assert_eq!(config.default_temperature, 1000.0);
        assert_eq!(config.gas_constant, 8.3144598);
        assert_eq!(config.level_filter(), LevelFilter::Debug);
        assert!(config.registry().contains("modified_arrhenius"));

        let mut broken = NamedTempFile::new().unwrap();
        write!(broken, "{{ not json").unwrap();
        let config = KineticsConfig::load_config(broken.path().to_str().unwrap());
        assert_eq!(config, KineticsConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_config = NamedTempFile::new().unwrap();
        let path = temp_config.path().to_str().unwrap();
        let config = KineticsConfig {
            default_temperature: 500.0,
            check_state: false,
            ..Default::default()
        };
        config.save_config(path).unwrap();
        assert_eq!(KineticsConfig::load_config(path), config);
    }
}
