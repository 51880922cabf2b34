use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::loaders::{ClimateColumns, DischargeColumns};
use crate::melt::DEFAULT_DEGREE_DAY_FACTOR;
use crate::models::{SeasonalWindow, SeasonalWindows};

pub const ENV_DEGREE_DAY_FACTOR: &str = "GLACIER_MELT_DEGREE_DAY_FACTOR";
pub const ENV_OUTPUT_DIR: &str = "GLACIER_MELT_OUTPUT_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// On-disk layout of the TOML config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default = "default_degree_day_factor")]
    degree_day_factor: f64,
    #[serde(default)]
    seasonal_windows: BTreeMap<String, SeasonalWindow>,
    #[serde(default)]
    climate_files: Vec<PathBuf>,
    discharge_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    #[serde(default)]
    climate_columns: ClimateColumns,
    #[serde(default)]
    discharge_columns: DischargeColumns,
}

fn default_degree_day_factor() -> f64 {
    DEFAULT_DEGREE_DAY_FACTOR
}

#[derive(Debug, Clone)]
pub struct Config {
    pub degree_day_factor: f64,
    pub seasonal_windows: SeasonalWindows,
    pub climate_files: Vec<PathBuf>,
    pub discharge_file: PathBuf,
    pub output_dir: PathBuf,
    pub climate_columns: ClimateColumns,
    pub discharge_columns: DischargeColumns,
}

impl Config {
    /// Read the config file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file. Relative paths inside it resolve against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&contents, base_dir)
    }

    pub fn from_toml_str(contents: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;

        let mut seasonal_windows = SeasonalWindows::new();
        for (key, window) in file.seasonal_windows {
            let year: i32 = key.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("seasonal_windows key '{key}' is not a year"))
            })?;
            seasonal_windows.insert(year, window);
        }

        let resolve = |p: PathBuf| {
            if p.is_absolute() {
                p
            } else {
                base_dir.join(p)
            }
        };

        let discharge_file = file
            .discharge_file
            .ok_or_else(|| ConfigError::Invalid("discharge_file is required".to_string()))?;

        Ok(Config {
            degree_day_factor: file.degree_day_factor,
            seasonal_windows,
            climate_files: file.climate_files.into_iter().map(resolve).collect(),
            discharge_file: resolve(discharge_file),
            output_dir: resolve(file.output_dir.unwrap_or_else(|| PathBuf::from("output"))),
            climate_columns: file.climate_columns,
            discharge_columns: file.discharge_columns,
        })
    }

    /// Override selected settings from the environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var(ENV_DEGREE_DAY_FACTOR) {
            self.degree_day_factor = value.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_DEGREE_DAY_FACTOR}='{value}' is not a number"))
            })?;
            debug!("Degree-day factor from environment: {}", self.degree_day_factor);
        }
        if let Ok(value) = env::var(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.degree_day_factor.is_finite() || self.degree_day_factor < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "degree_day_factor must be a non-negative number, got {}",
                self.degree_day_factor
            )));
        }
        if self.seasonal_windows.is_empty() {
            return Err(ConfigError::Invalid(
                "seasonal_windows must list at least one year".to_string(),
            ));
        }
        if self.climate_files.is_empty() {
            return Err(ConfigError::Invalid(
                "climate_files must list at least one file".to_string(),
            ));
        }
        Ok(())
    }
}
