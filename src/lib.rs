//! Longitudinal ship-motion digital twin.
//!
//! A vessel is modelled as a point mass pushed by a prime mover and held back
//! by a speed-dependent resistance curve. A [`voyage::Voyage`] walks an
//! ordered list of waypoints, applying each leg's thrust until the travelled
//! distance reaches the leg's cumulative great-circle target.

pub mod dynamics;
pub mod error;
pub mod output;
pub mod scenario;
pub mod twin;
pub mod voyage;

pub use voyage_config as config;
pub use voyage_core::{constants, geo, units};
pub use voyage_export as export;
pub use voyage_propulsion as propulsion;
pub use voyage_resistance as resistance;

pub use dynamics::{KinematicSample, MassBody};
pub use error::{ConfigurationError, VoyageWarning};
pub use twin::{SimulationRun, StepOutcome, TimeSeries};
pub use voyage::{Voyage, VoyageReport, Waypoint};
