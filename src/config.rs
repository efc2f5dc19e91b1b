use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::features::SplitConfig;
use crate::logging::LogConfig;
use crate::risk::InjuryRiskModel;
use crate::simulator::{parse_start_date, SimulationParams, DEFAULT_SEED};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults for a simulation run
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Injury risk model parameters
    #[serde(default)]
    pub risk: InjuryRiskModel,

    /// Train/validation/test split used by the ML export
    #[serde(default)]
    pub export: SplitConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Default simulation parameters, overridable from the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub player: String,
    pub start_date: NaiveDate,
    pub horizon_days: i64,
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            player: "Alex".to_string(),
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN),
            horizon_days: 1000,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationSettings {
    pub fn to_params(&self) -> SimulationParams {
        SimulationParams::new(
            self.player.clone(),
            self.start_date,
            self.horizon_days,
            self.seed,
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            risk: InjuryRiskModel::default(),
            export: SplitConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Keys understood by `get_value` and `set_value`
pub const CONFIG_KEYS: [&str; 6] = [
    "simulation.player",
    "simulation.start_date",
    "simulation.horizon_days",
    "simulation.seed",
    "risk.max_risk",
    "risk.noise_std_dev",
];

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("workloadrs")
            .join("config.toml")
    }

    /// Load the configuration a run should use
    ///
    /// An explicit path must exist and be valid. Without one, a missing default
    /// file means defaults; a default file that exists but fails to parse or
    /// validate is an error, so `config --set` never overwrites it.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(explicit) = path {
            return Self::load_from_file(explicit);
        }

        let default_path = Self::default_config_path();
        if default_path.exists() {
            Self::load_from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check every section describes a runnable simulation
    pub fn validate(&self) -> Result<()> {
        self.simulation.to_params().validate()?;
        self.risk.validate()?;
        self.export.validate()?;
        Ok(())
    }

    /// Read a single value by dotted key
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "simulation.player" => self.simulation.player.clone(),
            "simulation.start_date" => self.simulation.start_date.to_string(),
            "simulation.horizon_days" => self.simulation.horizon_days.to_string(),
            "simulation.seed" => self.simulation.seed.to_string(),
            "risk.max_risk" => self.risk.max_risk.to_string(),
            "risk.noise_std_dev" => self.risk.noise_std_dev.to_string(),
            _ => bail!("Unknown configuration key: {}", key),
        };
        Ok(value)
    }

    /// Update a single value by dotted key, rejecting values that fail validation
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "simulation.player" => updated.simulation.player = value.to_string(),
            "simulation.start_date" => updated.simulation.start_date = parse_start_date(value)?,
            "simulation.horizon_days" => {
                updated.simulation.horizon_days = value
                    .parse()
                    .with_context(|| format!("Invalid horizon: {}", value))?
            }
            "simulation.seed" => {
                updated.simulation.seed = value
                    .parse()
                    .with_context(|| format!("Invalid seed: {}", value))?
            }
            "risk.max_risk" => {
                updated.risk.max_risk = value
                    .parse()
                    .with_context(|| format!("Invalid max risk: {}", value))?
            }
            "risk.noise_std_dev" => {
                updated.risk.noise_std_dev = value
                    .parse()
                    .with_context(|| format!("Invalid noise std dev: {}", value))?
            }
            _ => bail!("Unknown configuration key: {}", key),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [simulation]
            player = "Sam"
            start_date = "2023-06-01"
            horizon_days = 90
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.player, "Sam");
        assert_eq!(config.simulation.horizon_days, 90);
        assert_eq!(config.risk, InjuryRiskModel::default());
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.set_value("simulation.player", "Jordan").unwrap();
        original.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.simulation.player, "Jordan");
    }

    #[test]
    fn test_set_value_validates() {
        let mut config = AppConfig::default();
        assert!(config.set_value("simulation.horizon_days", "0").is_err());
        assert_eq!(config.simulation.horizon_days, 1000);

        config.set_value("simulation.start_date", "03-15-2023").unwrap();
        assert_eq!(config.get_value("simulation.start_date").unwrap(), "2023-03-15");

        assert!(config.set_value("risk.max_risk", "2.0").is_err());
        assert!(config.get_value("nope").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        assert!(AppConfig::load_or_default(Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_explicit_invalid_config_is_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        fs::write(&path, "[simulation]\nhorizon_days = 0\n").unwrap();
        assert!(AppConfig::load_or_default(Some(path.as_path())).is_err());

        fs::write(&path, "[simulation\nplayer = \"Sam\"\n").unwrap();
        let err = AppConfig::load_or_default(Some(path.as_path())).unwrap_err();
        assert!(format!("{:#}", err).contains("TOML"));
    }

    #[test]
    fn test_explicit_valid_config_is_used() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[simulation]\nplayer = \"Sam\"\n").unwrap();

        let config = AppConfig::load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(config.simulation.player, "Sam");
        assert_eq!(config.simulation.horizon_days, 1000);
    }
}
