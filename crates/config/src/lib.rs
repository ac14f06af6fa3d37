//! Scenario manifests for the voyage twin.
//!
//! A manifest names the vessel mass, the integration step, and the two input
//! tables. TOML is used for `.toml` files, YAML for everything else.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use voyage_core::units::knots_to_ms;

/// Scenario manifest as written on disk.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Displacement in metric tonnes.
    pub mass_tonnes: f64,
    /// Fixed integration step in seconds.
    pub timestep_s: f64,
    /// Waypoint CSV: latitude, longitude, thrust.
    pub waypoints: PathBuf,
    /// Resistance CSV: speed, coefficient.
    pub resistance: PathBuf,
    #[serde(default)]
    pub speed_unit: SpeedUnit,
    #[serde(default)]
    pub distance_model: DistanceModelConfig,
    #[serde(default)]
    pub extrapolation: ExtrapolationConfig,
    /// Symmetric limit applied to thrust commands (N).
    #[serde(default)]
    pub max_thrust_newtons: Option<f64>,
    /// Hard stop for runs that never reach their final waypoint.
    #[serde(default)]
    pub max_steps: Option<u64>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub summary: Option<PathBuf>,
}

/// Unit of the speed column in the resistance table.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    Knots,
    #[serde(alias = "m/s", alias = "mps")]
    MetersPerSecond,
}

impl SpeedUnit {
    /// Convert a speed in this unit to m/s.
    pub fn to_ms(self, v: f64) -> f64 {
        match self {
            SpeedUnit::Knots => knots_to_ms(v),
            SpeedUnit::MetersPerSecond => v,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModelConfig {
    #[default]
    GreatCircle,
    #[serde(alias = "geodesic", alias = "wgs84")]
    Ellipsoidal,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationConfig {
    #[default]
    Clamp,
    Linear,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ScenarioConfig {
    /// Vessel mass in kilograms.
    pub fn mass_kg(&self) -> f64 {
        voyage_core::units::tonnes_to_kg(self.mass_tonnes)
    }

    /// Check the scalar fields before anything is simulated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mass_tonnes.is_finite() && self.mass_tonnes > 0.0) {
            return Err(invalid("mass_tonnes", format!("must be positive, got {}", self.mass_tonnes)));
        }
        if !(self.timestep_s.is_finite() && self.timestep_s > 0.0) {
            return Err(invalid("timestep_s", format!("must be positive, got {}", self.timestep_s)));
        }
        if let Some(limit) = self.max_thrust_newtons {
            if limit.is_nan() || limit < 0.0 {
                return Err(invalid("max_thrust_newtons", format!("must be non-negative, got {limit}")));
            }
        }
        if self.max_steps == Some(0) {
            return Err(invalid("max_steps", "must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Resolve relative table and output paths against `base`. `-` (stdout) is left alone.
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() && p.as_path() != Path::new("-") {
                *p = base.join(&*p);
            }
        };
        join(&mut self.waypoints);
        join(&mut self.resistance);
        if let Some(out) = self.output.as_mut() {
            join(out);
        }
        if let Some(summary) = self.summary.as_mut() {
            join(summary);
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// Parse a scenario manifest and resolve relative paths against its directory.
///
/// No validation happens here, so callers can apply overrides first.
pub fn parse_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let path = path.as_ref();
    let mut config: ScenarioConfig = if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)?
    } else {
        let reader = File::open(path)?;
        serde_yaml::from_reader(reader)?
    };
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Parse and validate a scenario manifest.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let config = parse_scenario(path)?;
    config.validate()?;
    Ok(config)
}
