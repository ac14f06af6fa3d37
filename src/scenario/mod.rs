//! Loading scenario inputs: waypoint and resistance CSV tables plus a manifest.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use thiserror::Error;
use voyage_config::{ConfigError, DistanceModelConfig, ExtrapolationConfig, ScenarioConfig, SpeedUnit};
use voyage_core::geo::DistanceModel;
use voyage_propulsion::PropulsionUnit;
use voyage_resistance::{ExtrapolationPolicy, ResistanceSample, ResistanceTable};

use crate::dynamics::MassBody;
use crate::error::ConfigurationError;
use crate::twin::SimulationRun;
use crate::voyage::{Voyage, VoyageLimits, Waypoint};

/// Waypoint row as exported by the planning sheet.
#[derive(Debug, Deserialize, Clone)]
pub struct WaypointRecord {
    #[serde(rename = "Latitude (deg)", alias = "latitude", alias = "lat")]
    pub latitude_deg: f64,
    #[serde(rename = "Longitude (deg)", alias = "longitude", alias = "lon")]
    pub longitude_deg: f64,
    #[serde(rename = "Thrust (N)", alias = "thrust", alias = "thrust_n")]
    pub thrust_n: f64,
}

impl From<WaypointRecord> for Waypoint {
    fn from(value: WaypointRecord) -> Self {
        Waypoint::new(value.latitude_deg, value.longitude_deg, value.thrust_n)
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}, line {line}: {message}", path.display())]
    Row {
        path: PathBuf,
        line: u64,
        message: String,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ScenarioError {
    fn csv(path: &Path, source: csv::Error) -> Self {
        ScenarioError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ScenarioError> {
    let file = std::fs::File::open(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ReaderBuilder::new().trim(Trim::All).from_reader(file))
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

/// Read waypoints in file order. Rows with every field empty are skipped.
pub fn load_waypoints<P: AsRef<Path>>(path: P) -> Result<Vec<Waypoint>, ScenarioError> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;
    let headers = rdr.headers().map_err(|e| ScenarioError::csv(path, e))?.clone();

    let mut waypoints = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ScenarioError::csv(path, e))?;
        if is_blank(&record) {
            continue;
        }
        let row: WaypointRecord =
            record
                .deserialize(Some(&headers))
                .map_err(|e| ScenarioError::Row {
                    path: path.to_path_buf(),
                    line: line_of(&record),
                    message: e.to_string(),
                })?;
        waypoints.push(row.into());
    }
    Ok(waypoints)
}

/// Read a two-column resistance table, converting the speed column to m/s.
///
/// Header names are free; only column order matters.
pub fn load_resistance<P: AsRef<Path>>(
    path: P,
    unit: SpeedUnit,
) -> Result<Vec<ResistanceSample>, ScenarioError> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;

    let mut samples = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ScenarioError::csv(path, e))?;
        if is_blank(&record) {
            continue;
        }
        let line = line_of(&record);
        let field = |idx: usize, name: &str| -> Result<f64, ScenarioError> {
            let raw = record.get(idx).unwrap_or_default();
            raw.parse::<f64>().map_err(|e| ScenarioError::Row {
                path: path.to_path_buf(),
                line,
                message: format!("{name} `{raw}`: {e}"),
            })
        };
        let speed = field(0, "speed")?;
        let coefficient = field(1, "resistance")?;
        samples.push(ResistanceSample::new(unit.to_ms(speed), coefficient));
    }
    Ok(samples)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn distance_model(value: DistanceModelConfig) -> DistanceModel {
    match value {
        DistanceModelConfig::GreatCircle => DistanceModel::GreatCircle,
        DistanceModelConfig::Ellipsoidal => DistanceModel::Ellipsoidal,
    }
}

fn extrapolation_policy(value: ExtrapolationConfig) -> ExtrapolationPolicy {
    match value {
        ExtrapolationConfig::Clamp => ExtrapolationPolicy::Clamp,
        ExtrapolationConfig::Linear => ExtrapolationPolicy::Linear,
    }
}

/// Assemble a ready-to-run voyage from a validated manifest.
pub fn build_voyage(config: &ScenarioConfig) -> Result<Voyage, ScenarioError> {
    config.validate()?;
    let waypoints = load_waypoints(&config.waypoints)?;
    let samples = load_resistance(&config.resistance, config.speed_unit)?;

    let table = ResistanceTable::with_policy(samples, extrapolation_policy(config.extrapolation))
        .map_err(ConfigurationError::from)?;
    let propulsion = match config.max_thrust_newtons {
        Some(limit) => PropulsionUnit::with_limit(0.0, limit),
        None => PropulsionUnit::default(),
    };
    let run = SimulationRun::new(
        config.timestep_s,
        MassBody::new(config.mass_kg())?,
        propulsion,
        table,
    )?;
    let voyage = Voyage::new(run, &waypoints, distance_model(config.distance_model))?;
    Ok(voyage.with_limits(VoyageLimits {
        max_steps: config.max_steps,
    }))
}

/// Load a manifest from disk and assemble its voyage.
pub fn load_voyage<P: AsRef<Path>>(manifest: P) -> Result<(ScenarioConfig, Voyage), ScenarioError> {
    let config = voyage_config::parse_scenario(manifest)?;
    let voyage = build_voyage(&config)?;
    Ok((config, voyage))
}
