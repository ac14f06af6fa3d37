//! Fatal configuration errors and the non-fatal warnings a run can collect.

use thiserror::Error;
use voyage_resistance::ResistanceError;

/// Problems detected before any simulation step runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("vessel mass must be positive and finite, got {0} kg")]
    InvalidMass(f64),
    #[error("timestep must be positive and finite, got {0} s")]
    InvalidTimestep(f64),
    #[error("resistance table rejected: {0}")]
    Resistance(#[from] ResistanceError),
    #[error("at least two waypoints are needed to form a leg, got {0}")]
    TooFewWaypoints(usize),
    #[error("waypoint {index} has a non-finite {field}")]
    NonFiniteWaypoint { index: usize, field: &'static str },
}

/// Conditions that degrade a run without stopping it.
#[derive(Debug, Clone, PartialEq)]
pub enum VoyageWarning {
    /// Speeds outside the sampled resistance range were queried.
    ResistanceOutOfRange {
        queries: u64,
        first_step: u64,
        min_speed_m_s: f64,
        max_speed_m_s: f64,
    },
    /// A leg between coincident waypoints; no steps were taken for it.
    DegenerateLeg { leg: usize },
}

impl std::fmt::Display for VoyageWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoyageWarning::ResistanceOutOfRange {
                queries,
                first_step,
                min_speed_m_s,
                max_speed_m_s,
            } => write!(
                f,
                "{queries} resistance queries outside the sampled range (first at step {first_step}, speeds {min_speed_m_s:.3}..{max_speed_m_s:.3} m/s)"
            ),
            VoyageWarning::DegenerateLeg { leg } => {
                write!(f, "leg {leg} has zero length and was skipped")
            }
        }
    }
}
