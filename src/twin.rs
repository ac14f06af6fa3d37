//! Fixed-step orchestration of propulsion, resistance, and the mass body.

use tracing::warn;
use voyage_propulsion::PropulsionUnit;
use voyage_resistance::{Domain, ResistanceTable};

use crate::dynamics::{KinematicSample, MassBody};
use crate::error::{ConfigurationError, VoyageWarning};

/// What happened during one call to [`SimulationRun::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub step: u64,
    pub elapsed_s: f64,
    pub thrust_n: f64,
    pub resistance_n: f64,
    pub state: KinematicSample,
    pub resistance_domain: Domain,
}

/// Index-aligned histories of a finished run. Every series has `steps + 1` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub time_s: Vec<f64>,
    pub position_m: Vec<f64>,
    pub velocity_m_s: Vec<f64>,
    pub acceleration_m_s2: Vec<f64>,
    pub thrust_n: Vec<f64>,
    pub resistance_n: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }

    /// Number of integration steps represented (length minus the initial entry).
    pub fn steps(&self) -> usize {
        self.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct OutOfRange {
    queries: u64,
    first_step: u64,
    min_speed: f64,
    max_speed: f64,
}

/// A single execution of the twin: owns the three sub-models and the clock.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    timestep_s: f64,
    step_count: u64,
    elapsed_s: Vec<f64>,
    resistance_n: Vec<f64>,
    body: MassBody,
    propulsion: PropulsionUnit,
    resistance: ResistanceTable,
    out_of_range: Option<OutOfRange>,
}

impl SimulationRun {
    pub fn new(
        timestep_s: f64,
        body: MassBody,
        propulsion: PropulsionUnit,
        resistance: ResistanceTable,
    ) -> Result<Self, ConfigurationError> {
        if !(timestep_s.is_finite() && timestep_s > 0.0) {
            return Err(ConfigurationError::InvalidTimestep(timestep_s));
        }
        Ok(Self {
            timestep_s,
            step_count: 0,
            elapsed_s: vec![0.0],
            resistance_n: vec![0.0],
            body,
            propulsion,
            resistance,
            out_of_range: None,
        })
    }

    /// Run for a body of `mass_kg` at rest with zero initial thrust.
    pub fn at_rest(
        mass_kg: f64,
        timestep_s: f64,
        resistance: ResistanceTable,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            timestep_s,
            MassBody::new(mass_kg)?,
            PropulsionUnit::default(),
            resistance,
        )
    }

    /// Advance the twin by one timestep.
    ///
    /// Resistance is evaluated at the velocity from *before* this step, so the
    /// drag force lags the kinematics by one step.
    pub fn step(&mut self) -> StepOutcome {
        let thrust = self.propulsion.record();
        let velocity = self.body.velocity();
        let lookup = self.resistance.lookup(velocity);
        if lookup.is_extrapolated() {
            self.note_out_of_range(velocity);
        }
        self.resistance_n.push(lookup.coefficient);

        let state = self
            .body
            .integrate(thrust - lookup.coefficient, self.timestep_s);

        self.step_count += 1;
        let elapsed = self.step_count as f64 * self.timestep_s;
        self.elapsed_s.push(elapsed);

        StepOutcome {
            step: self.step_count,
            elapsed_s: elapsed,
            thrust_n: thrust,
            resistance_n: lookup.coefficient,
            state,
            resistance_domain: lookup.domain,
        }
    }

    fn note_out_of_range(&mut self, speed: f64) {
        match self.out_of_range.as_mut() {
            Some(tally) => {
                tally.queries += 1;
                tally.min_speed = tally.min_speed.min(speed);
                tally.max_speed = tally.max_speed.max(speed);
            }
            None => {
                let (lo, hi) = self.resistance.speed_range();
                warn!(
                    step = self.step_count + 1,
                    speed_m_s = speed,
                    table_min_m_s = lo,
                    table_max_m_s = hi,
                    policy = ?self.resistance.policy(),
                    "speed outside resistance table"
                );
                self.out_of_range = Some(OutOfRange {
                    queries: 1,
                    first_step: self.step_count + 1,
                    min_speed: speed,
                    max_speed: speed,
                });
            }
        }
    }

    /// Command the prime mover. Applies from the next step.
    pub fn set_thrust(&mut self, force_n: f64) {
        self.propulsion.set_force(force_n);
    }

    pub fn timestep(&self) -> f64 {
        self.timestep_s
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn position(&self) -> f64 {
        self.body.position()
    }

    pub fn elapsed(&self) -> &[f64] {
        &self.elapsed_s
    }

    pub fn resistance_history(&self) -> &[f64] {
        &self.resistance_n
    }

    pub fn body(&self) -> &MassBody {
        &self.body
    }

    pub fn propulsion(&self) -> &PropulsionUnit {
        &self.propulsion
    }

    pub fn resistance_table(&self) -> &ResistanceTable {
        &self.resistance
    }

    /// Pre-size every history for `additional` more steps.
    pub fn reserve(&mut self, additional: usize) {
        self.elapsed_s.reserve(additional);
        self.resistance_n.reserve(additional);
        self.body.reserve(additional);
        self.propulsion.reserve(additional);
    }

    /// Summary of out-of-range resistance queries, if any occurred.
    pub fn resistance_warning(&self) -> Option<VoyageWarning> {
        self.out_of_range.map(|t| VoyageWarning::ResistanceOutOfRange {
            queries: t.queries,
            first_step: t.first_step,
            min_speed_m_s: t.min_speed,
            max_speed_m_s: t.max_speed,
        })
    }

    /// Consume the run and hand back its histories.
    pub fn into_series(self) -> TimeSeries {
        let (position_m, velocity_m_s, acceleration_m_s2) = self.body.into_histories();
        TimeSeries {
            time_s: self.elapsed_s,
            position_m,
            velocity_m_s,
            acceleration_m_s2,
            thrust_n: self.propulsion.into_history(),
            resistance_n: self.resistance_n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_table() -> ResistanceTable {
        ResistanceTable::from_pairs(&[(0.0, 0.0), (10.0, 100.0)]).unwrap()
    }

    #[test]
    fn zero_timestep_is_rejected() {
        let err = SimulationRun::at_rest(1_000.0, 0.0, linear_table()).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidTimestep(0.0));
    }

    #[test]
    fn zero_mass_is_rejected() {
        let err = SimulationRun::at_rest(0.0, 1.0, linear_table()).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidMass(0.0));
    }

    #[test]
    fn resistance_uses_pre_step_velocity() {
        let mut run = SimulationRun::at_rest(1_000.0, 1.0, linear_table()).unwrap();
        run.set_thrust(1_000.0);

        let first = run.step();
        // at rest: no drag on the first step
        assert_eq!(first.resistance_n, 0.0);
        assert_eq!(first.state.acceleration_m_s2, 1.0);
        assert_eq!(first.state.velocity_m_s, 1.0);

        let second = run.step();
        // drag evaluated at v = 1.0 from the previous step
        assert_relative_eq!(second.resistance_n, 10.0, epsilon = 1e-12);
        assert_relative_eq!(second.state.acceleration_m_s2, 0.99, epsilon = 1e-12);
    }

    #[test]
    fn histories_stay_aligned() {
        let mut run = SimulationRun::at_rest(500.0, 0.1, linear_table()).unwrap();
        run.set_thrust(50.0);
        for _ in 0..25 {
            run.step();
        }
        assert_eq!(run.step_count(), 25);
        let series = run.into_series();
        assert_eq!(series.len(), 26);
        assert_eq!(series.steps(), 25);
        for len in [
            series.position_m.len(),
            series.velocity_m_s.len(),
            series.acceleration_m_s2.len(),
            series.thrust_n.len(),
            series.resistance_n.len(),
        ] {
            assert_eq!(len, 26);
        }
        assert_relative_eq!(series.time_s[25], 2.5, epsilon = 1e-12);
        assert_eq!(series.thrust_n[0], 0.0);
        assert_eq!(series.thrust_n[1], 50.0);
    }

    #[test]
    fn elapsed_time_is_step_times_dt() {
        let mut run = SimulationRun::at_rest(1.0, 0.1, linear_table()).unwrap();
        for _ in 0..3 {
            run.step();
        }
        // multiplied, not accumulated
        assert_eq!(run.elapsed()[3], 3.0 * 0.1);
    }

    #[test]
    fn out_of_range_queries_are_tallied() {
        let table = ResistanceTable::from_pairs(&[(0.0, 0.0), (1.0, 1.0)]).unwrap();
        let mut run = SimulationRun::at_rest(1.0, 1.0, table).unwrap();
        run.set_thrust(10.0);
        for _ in 0..4 {
            run.step();
        }
        match run.resistance_warning() {
            Some(VoyageWarning::ResistanceOutOfRange {
                queries,
                first_step,
                ..
            }) => {
                // v after step 1 is 10 m/s, beyond the 1 m/s table edge
                assert_eq!(first_step, 2);
                assert_eq!(queries, 3);
            }
            other => panic!("expected out-of-range warning, got {other:?}"),
        }
    }
}
