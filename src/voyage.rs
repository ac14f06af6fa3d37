//! Waypoint-driven run loop.
//!
//! A [`Voyage`] turns an ordered list of waypoints into legs, applies each
//! leg's thrust, and steps the [`SimulationRun`] until the travelled distance
//! reaches the leg's cumulative target. Waypoint-change markers record the
//! step index at which every leg begins, plus one final marker when the loop
//! ends.

use tracing::{debug, info, warn};
use voyage_core::geo::{DistanceModel, LatLon};

use crate::error::{ConfigurationError, VoyageWarning};
use crate::twin::{SimulationRun, StepOutcome, TimeSeries};

/// Cap on histories pre-sized from a step limit.
const MAX_PRESIZE_STEPS: u64 = 1 << 20;

/// Operator-defined waypoint with the thrust to apply on the leg that starts here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub position: LatLon,
    pub thrust_n: f64,
}

impl Waypoint {
    pub fn new(lat_deg: f64, lon_deg: f64, thrust_n: f64) -> Self {
        Self {
            position: LatLon::new(lat_deg, lon_deg),
            thrust_n,
        }
    }
}

/// Segment between two consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub index: usize,
    pub from: LatLon,
    pub to: LatLon,
    pub distance_m: f64,
    /// Cumulative distance from the first waypoint to the end of this leg.
    pub target_m: f64,
    pub thrust_n: f64,
}

impl Leg {
    pub fn is_degenerate(&self) -> bool {
        self.distance_m == 0.0
    }
}

/// Build legs with cumulative targets from an ordered waypoint list.
///
/// Each leg flies with the thrust of its starting waypoint; the last
/// waypoint's thrust is never applied.
pub fn plan_legs(
    waypoints: &[Waypoint],
    model: DistanceModel,
) -> Result<Vec<Leg>, ConfigurationError> {
    if waypoints.len() < 2 {
        return Err(ConfigurationError::TooFewWaypoints(waypoints.len()));
    }
    for (index, wp) in waypoints.iter().enumerate() {
        let field = if !wp.position.lat_deg.is_finite() {
            Some("latitude")
        } else if !wp.position.lon_deg.is_finite() {
            Some("longitude")
        } else if !wp.thrust_n.is_finite() {
            Some("thrust")
        } else {
            None
        };
        if let Some(field) = field {
            return Err(ConfigurationError::NonFiniteWaypoint { index, field });
        }
    }

    let mut cumulative = 0.0;
    Ok(waypoints
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let distance_m = model.distance_m(pair[0].position, pair[1].position);
            cumulative += distance_m;
            Leg {
                index,
                from: pair[0].position,
                to: pair[1].position,
                distance_m,
                target_m: cumulative,
                thrust_n: pair[0].thrust_n,
            }
        })
        .collect())
}

/// Observer verdict after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepControl {
    #[default]
    Continue,
    /// Stop cooperatively before the next step.
    Stop,
}

/// Progress snapshot handed to observers after every step.
#[derive(Debug, Clone, Copy)]
pub struct StepProgress<'a> {
    pub leg: &'a Leg,
    pub leg_count: usize,
    pub outcome: &'a StepOutcome,
    pub total_distance_m: f64,
}

impl StepProgress<'_> {
    /// Fraction of the whole route covered, in `[0, 1]`.
    pub fn fraction_complete(&self) -> f64 {
        if self.total_distance_m > 0.0 {
            (self.outcome.state.position_m / self.total_distance_m).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Hooks for progress reporting and cancellation. Observers cannot change results.
pub trait VoyageObserver {
    /// Called when a leg's thrust has been applied, before its first step.
    fn on_leg_start(&mut self, _leg: &Leg, _step: u64) {}

    /// Called after every step.
    fn on_step(&mut self, _progress: &StepProgress<'_>) -> StepControl {
        StepControl::Continue
    }

    /// Called when a leg's distance condition is met.
    fn on_leg_end(&mut self, _leg: &LegSummary) {}
}

/// Observer that ignores everything.
impl VoyageObserver for () {}

/// Adapter turning a closure into a step observer.
pub struct OnStep<F>(F);

impl<F> OnStep<F>
where
    F: FnMut(&StepProgress<'_>) -> StepControl,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> VoyageObserver for OnStep<F>
where
    F: FnMut(&StepProgress<'_>) -> StepControl,
{
    fn on_step(&mut self, progress: &StepProgress<'_>) -> StepControl {
        (self.0)(progress)
    }
}

/// Optional bounds on a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoyageLimits {
    /// Stop after this many steps even if the last waypoint was not reached.
    pub max_steps: Option<u64>,
}

/// Why the run loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every leg's distance condition was met.
    Completed,
    /// An observer returned [`StepControl::Stop`] during leg `leg`.
    Cancelled { leg: usize },
    /// `max_steps` was reached during leg `leg`.
    StepLimitReached { leg: usize },
}

impl Termination {
    pub fn is_completed(&self) -> bool {
        matches!(self, Termination::Completed)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Completed => write!(f, "completed"),
            Termination::Cancelled { leg } => write!(f, "cancelled during leg {leg}"),
            Termination::StepLimitReached { leg } => {
                write!(f, "step limit reached during leg {leg}")
            }
        }
    }
}

/// Per-leg bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegSummary {
    pub index: usize,
    pub distance_m: f64,
    pub target_m: f64,
    pub thrust_n: f64,
    pub start_step: u64,
    pub end_step: u64,
    pub start_time_s: f64,
    pub end_time_s: f64,
    pub end_velocity_m_s: f64,
}

impl LegSummary {
    pub fn steps(&self) -> u64 {
        self.end_step - self.start_step
    }
}

/// Everything a finished voyage produces.
#[derive(Debug, Clone)]
pub struct VoyageReport {
    pub mass_kg: f64,
    pub timestep_s: f64,
    pub series: TimeSeries,
    /// Step index at which each leg began, followed by the final step. One per waypoint on completion.
    pub waypoint_markers: Vec<usize>,
    pub legs: Vec<LegSummary>,
    pub warnings: Vec<VoyageWarning>,
    pub termination: Termination,
}

impl VoyageReport {
    pub fn steps(&self) -> usize {
        self.series.steps()
    }

    pub fn duration_s(&self) -> f64 {
        self.series.time_s.last().copied().unwrap_or_default()
    }

    pub fn distance_m(&self) -> f64 {
        self.series.position_m.last().copied().unwrap_or_default()
    }

    pub fn max_velocity_m_s(&self) -> f64 {
        self.series
            .velocity_m_s
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingLeg(usize),
    Stepping(usize),
    Finished(Termination),
}

/// Leg controller: owns the run and the planned legs.
#[derive(Debug, Clone)]
pub struct Voyage {
    run: SimulationRun,
    legs: Vec<Leg>,
    limits: VoyageLimits,
}

impl Voyage {
    /// Plan legs over `waypoints` and attach them to `run`.
    pub fn new(
        run: SimulationRun,
        waypoints: &[Waypoint],
        model: DistanceModel,
    ) -> Result<Self, ConfigurationError> {
        let legs = plan_legs(waypoints, model)?;
        Ok(Self {
            run,
            legs,
            limits: VoyageLimits::default(),
        })
    }

    pub fn with_limits(mut self, limits: VoyageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn total_distance_m(&self) -> f64 {
        self.legs.last().map(|leg| leg.target_m).unwrap_or_default()
    }

    /// Run to completion without observation.
    pub fn run(self) -> VoyageReport {
        self.run_with(&mut ())
    }

    /// Run, reporting progress to `observer`.
    pub fn run_with<O: VoyageObserver + ?Sized>(mut self, observer: &mut O) -> VoyageReport {
        if let Some(limit) = self.limits.max_steps {
            self.run.reserve(limit.min(MAX_PRESIZE_STEPS) as usize);
        }

        let leg_count = self.legs.len();
        let total_distance_m = self.total_distance_m();
        let mut markers = Vec::with_capacity(leg_count + 1);
        let mut summaries = Vec::with_capacity(leg_count);
        let mut warnings = Vec::new();
        let mut open: Option<LegSummary> = None;

        info!(
            legs = leg_count,
            total_distance_m,
            timestep_s = self.run.timestep(),
            "voyage started"
        );

        let mut phase = Phase::AwaitingLeg(0);
        let termination = loop {
            phase = match phase {
                Phase::AwaitingLeg(i) if i >= leg_count => Phase::Finished(Termination::Completed),
                Phase::AwaitingLeg(i) => {
                    let leg = self.legs[i];
                    let step = self.run.step_count();
                    markers.push(step as usize);
                    self.run.set_thrust(leg.thrust_n);
                    debug!(
                        leg = i,
                        distance_m = leg.distance_m,
                        target_m = leg.target_m,
                        thrust_n = leg.thrust_n,
                        "leg started"
                    );
                    if leg.is_degenerate() {
                        warn!(leg = i, "zero-length leg between coincident waypoints");
                        warnings.push(VoyageWarning::DegenerateLeg { leg: i });
                    }
                    open = Some(self.open_summary(&leg));
                    observer.on_leg_start(&leg, step);
                    Phase::Stepping(i)
                }
                Phase::Stepping(i) => {
                    let leg = self.legs[i];
                    if self.run.position() >= leg.target_m {
                        if let Some(mut summary) = open.take() {
                            self.close_summary(&mut summary);
                            info!(
                                leg = i,
                                steps = summary.steps(),
                                elapsed_s = summary.end_time_s,
                                "leg finished"
                            );
                            observer.on_leg_end(&summary);
                            summaries.push(summary);
                        }
                        Phase::AwaitingLeg(i + 1)
                    } else if self
                        .limits
                        .max_steps
                        .is_some_and(|limit| self.run.step_count() >= limit)
                    {
                        warn!(leg = i, steps = self.run.step_count(), "step limit reached");
                        Phase::Finished(Termination::StepLimitReached { leg: i })
                    } else {
                        let outcome = self.run.step();
                        let progress = StepProgress {
                            leg: &leg,
                            leg_count,
                            outcome: &outcome,
                            total_distance_m,
                        };
                        match observer.on_step(&progress) {
                            StepControl::Continue => Phase::Stepping(i),
                            StepControl::Stop => {
                                info!(leg = i, step = outcome.step, "voyage cancelled");
                                Phase::Finished(Termination::Cancelled { leg: i })
                            }
                        }
                    }
                }
                Phase::Finished(termination) => break termination,
            };
        };

        // a leg interrupted by cancellation or the step limit is still reported
        if let Some(mut summary) = open.take() {
            self.close_summary(&mut summary);
            summaries.push(summary);
        }
        markers.push(self.run.step_count() as usize);
        if let Some(warning) = self.run.resistance_warning() {
            warnings.insert(0, warning);
        }

        info!(
            steps = self.run.step_count(),
            distance_m = self.run.position(),
            ?termination,
            "voyage finished"
        );

        let mass_kg = self.run.body().mass_kg();
        let timestep_s = self.run.timestep();
        VoyageReport {
            mass_kg,
            timestep_s,
            series: self.run.into_series(),
            waypoint_markers: markers,
            legs: summaries,
            warnings,
            termination,
        }
    }

    fn open_summary(&self, leg: &Leg) -> LegSummary {
        let step = self.run.step_count();
        let time = self.run.elapsed().last().copied().unwrap_or_default();
        LegSummary {
            index: leg.index,
            distance_m: leg.distance_m,
            target_m: leg.target_m,
            thrust_n: leg.thrust_n,
            start_step: step,
            end_step: step,
            start_time_s: time,
            end_time_s: time,
            end_velocity_m_s: self.run.body().velocity(),
        }
    }

    fn close_summary(&self, summary: &mut LegSummary) {
        summary.end_step = self.run.step_count();
        summary.end_time_s = self.run.elapsed().last().copied().unwrap_or_default();
        summary.end_velocity_m_s = self.run.body().velocity();
    }
}
