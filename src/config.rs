//! Report configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ensure_non_negative, ensure_percentage};
use crate::monte_carlo::SweepConfig;
use crate::scenario::Scenario;
use crate::state::InitialConditions;

pub const CONFIG_ENV: &str = "HYLO_SIM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "hylo-sim.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Protocol state every calculator starts from
    pub collateral_value: f64,
    pub stable_supply: f64,
    pub staked_percentage: f64,
    pub asset_price: f64,

    /// Yield calculator: base yield earned on collateral (percent)
    pub base_yield: f64,

    /// Yield calculator: share of the yield paid to stakers (percent)
    pub yield_distribution_percentage: f64,

    /// Depeg calculator: single price shock (percent)
    pub price_drop_percentage: f64,

    /// Scenario keys for the stress report; unknown keys run as moderate
    pub scenarios: Vec<String>,

    pub monte_carlo: SweepConfig,

    /// Dump stress results as JSON to this path
    pub json_output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collateral_value: 10_000_000.0,
            stable_supply: 5_000_000.0,
            staked_percentage: 30.0,
            asset_price: 100.0,
            base_yield: 8.0,
            yield_distribution_percentage: 80.0,
            price_drop_percentage: 50.0,
            scenarios: Scenario::all().iter().map(|s| s.key().to_string()).collect(),
            monte_carlo: SweepConfig::default(),
            json_output: None,
        }
    }
}

impl Config {
    fn path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
            .into()
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml(&config_str)
    }

    /// Load configuration from the TOML file named by `HYLO_SIM_CONFIG`.
    /// A missing file yields the defaults; a file that does not parse is an
    /// error.
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(&Self::path())
    }

    pub fn load_or_default_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            Self::load_from(config_path)?
        } else {
            log::warn!("{} not found, using default config", config_path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config TOML")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.initial_conditions()
            .validate()
            .context("invalid protocol state in config")?;
        ensure_non_negative("base_yield", self.base_yield)
            .context("invalid yield calculator input in config")?;
        ensure_percentage("yield_distribution_percentage", self.yield_distribution_percentage)
            .context("invalid yield calculator input in config")?;
        ensure_percentage("price_drop_percentage", self.price_drop_percentage)
            .context("invalid depeg calculator input in config")?;
        self.monte_carlo
            .validate()
            .context("invalid monte_carlo section")?;
        Ok(())
    }

    pub fn initial_conditions(&self) -> InitialConditions {
        InitialConditions {
            collateral_value: self.collateral_value,
            stable_supply: self.stable_supply,
            staked_percentage: self.staked_percentage,
            asset_price: self.asset_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.collateral_value, 10_000_000.0);
        assert_eq!(config.scenarios.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            stable_supply = 6000000.0
            scenarios = ["severe"]

            [monte_carlo]
            runs = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.stable_supply, 6_000_000.0);
        assert_eq!(config.collateral_value, 10_000_000.0);
        assert_eq!(config.scenarios, vec!["severe".to_string()]);
        assert_eq!(config.monte_carlo.runs, 25);
        assert_eq!(config.monte_carlo.seed, 42);
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_validate_rejects_bad_calculator_inputs() {
        let config = Config {
            price_drop_percentage: 120.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            yield_distribution_percentage: -1.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            base_yield: f64::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("hylo-sim-no-such-config.toml");
        let _ = std::fs::remove_file(&path);
        assert_eq!(Config::load_or_default_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = std::env::temp_dir().join("hylo-sim-malformed-config.toml");
        std::fs::write(&path, "collateral_value = \"lots\"\n").unwrap();
        let result = Config::load_or_default_from(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_supply() {
        let config = Config {
            stable_supply: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
