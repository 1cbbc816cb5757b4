//! Loading, saving and overriding simulation configurations.

use std::path::Path;
use std::str::FromStr;

use pl_sim::SimulationConfig;

use crate::error::{AppError, AppResult};

/// On-disk configuration encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension (`.yaml`, `.yml`, `.json`).
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        ext.parse()
            .map_err(|_| AppError::UnsupportedFormat(path.display().to_string()))
    }
}

impl FromStr for ConfigFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Parse and validate a configuration. Missing fields take reference defaults.
pub fn parse_config_str(text: &str, format: ConfigFormat) -> AppResult<SimulationConfig> {
    let config: SimulationConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
    };
    config.validate()?;
    Ok(config)
}

pub fn to_config_string(config: &SimulationConfig, format: ConfigFormat) -> AppResult<String> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml::to_string(config).map_err(|e| AppError::Serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).map_err(|e| AppError::Serialization(e.to_string()))
        }
    }
}

pub fn load_config(path: &Path) -> AppResult<SimulationConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_str(&content, format)?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Validate and write a configuration; invalid configurations are never saved.
pub fn save_config(path: &Path, config: &SimulationConfig) -> AppResult<()> {
    config.validate()?;
    let format = ConfigFormat::from_path(path)?;
    let content = to_config_string(config, format)?;
    std::fs::write(path, content).map_err(|source| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-field replacements applied on top of a base configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub inertia: Option<f64>,
    pub kp: Option<f64>,
    pub ki: Option<f64>,
    pub kd: Option<f64>,
    pub saturation_limit: Option<f64>,
    pub noise_level: Option<f64>,
    pub anti_windup_enabled: Option<bool>,
    pub reference: Option<f64>,
    pub time_step: Option<f64>,
    pub total_time: Option<f64>,
}

impl ConfigOverrides {
    /// Return `base` with every set override applied. Does not validate.
    pub fn apply(&self, base: &SimulationConfig) -> SimulationConfig {
        SimulationConfig {
            inertia: self.inertia.unwrap_or(base.inertia),
            kp: self.kp.unwrap_or(base.kp),
            ki: self.ki.unwrap_or(base.ki),
            kd: self.kd.unwrap_or(base.kd),
            saturation_limit: self.saturation_limit.unwrap_or(base.saturation_limit),
            noise_level: self.noise_level.unwrap_or(base.noise_level),
            anti_windup_enabled: self.anti_windup_enabled.unwrap_or(base.anti_windup_enabled),
            reference: self.reference.unwrap_or(base.reference),
            time_step: self.time_step.unwrap_or(base.time_step),
            total_time: self.total_time.unwrap_or(base.total_time),
        }
    }
}
