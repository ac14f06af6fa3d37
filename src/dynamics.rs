//! Point-mass longitudinal dynamics.

use crate::error::ConfigurationError;

/// Kinematic state at one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicSample {
    pub position_m: f64,
    pub velocity_m_s: f64,
    pub acceleration_m_s2: f64,
}

/// A rigid mass moving along a single axis, integrated with semi-implicit Euler.
#[derive(Debug, Clone)]
pub struct MassBody {
    mass_kg: f64,
    state: KinematicSample,
    position_history: Vec<f64>,
    velocity_history: Vec<f64>,
    acceleration_history: Vec<f64>,
}

impl MassBody {
    /// Body at rest at the origin.
    pub fn new(mass_kg: f64) -> Result<Self, ConfigurationError> {
        Self::with_initial_state(mass_kg, KinematicSample::default())
    }

    pub fn with_initial_state(
        mass_kg: f64,
        initial: KinematicSample,
    ) -> Result<Self, ConfigurationError> {
        if !(mass_kg.is_finite() && mass_kg > 0.0) {
            return Err(ConfigurationError::InvalidMass(mass_kg));
        }
        Ok(Self {
            mass_kg,
            state: initial,
            position_history: vec![initial.position_m],
            velocity_history: vec![initial.velocity_m_s],
            acceleration_history: vec![initial.acceleration_m_s2],
        })
    }

    /// Advance one step under `net_force_n` (N) over `dt` (s).
    ///
    /// Order matters: acceleration, then velocity, then position from the
    /// already-updated velocity.
    pub fn integrate(&mut self, net_force_n: f64, dt: f64) -> KinematicSample {
        let s = &mut self.state;
        s.acceleration_m_s2 = net_force_n / self.mass_kg;
        s.velocity_m_s += s.acceleration_m_s2 * dt;
        s.position_m += s.velocity_m_s * dt;

        self.acceleration_history.push(s.acceleration_m_s2);
        self.velocity_history.push(s.velocity_m_s);
        self.position_history.push(s.position_m);
        *s
    }

    pub fn mass_kg(&self) -> f64 {
        self.mass_kg
    }

    pub fn state(&self) -> KinematicSample {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.state.position_m
    }

    pub fn velocity(&self) -> f64 {
        self.state.velocity_m_s
    }

    pub fn position_history(&self) -> &[f64] {
        &self.position_history
    }

    pub fn velocity_history(&self) -> &[f64] {
        &self.velocity_history
    }

    pub fn acceleration_history(&self) -> &[f64] {
        &self.acceleration_history
    }

    pub fn reserve(&mut self, additional: usize) {
        self.position_history.reserve(additional);
        self.velocity_history.reserve(additional);
        self.acceleration_history.reserve(additional);
    }

    /// Consume the body, returning `(position, velocity, acceleration)` histories.
    pub fn into_histories(self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            self.position_history,
            self.velocity_history,
            self.acceleration_history,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_non_positive_mass() {
        assert_eq!(
            MassBody::new(0.0).unwrap_err(),
            ConfigurationError::InvalidMass(0.0)
        );
        assert!(MassBody::new(-5.0).is_err());
        assert!(MassBody::new(f64::NAN).is_err());
    }

    #[test]
    fn position_uses_updated_velocity() {
        let mut body = MassBody::new(2.0).unwrap();
        let s = body.integrate(4.0, 0.5);
        assert_eq!(s.acceleration_m_s2, 2.0);
        assert_eq!(s.velocity_m_s, 1.0);
        // explicit Euler would leave position at 0
        assert_eq!(s.position_m, 0.5);
    }

    #[test]
    fn constant_force_gives_linear_velocity() {
        let (mass, force, dt) = (1_500.0, 300.0, 0.25);
        let mut body = MassBody::new(mass).unwrap();
        let n = 400;
        for _ in 0..n {
            body.integrate(force, dt);
        }
        assert_relative_eq!(
            body.velocity(),
            n as f64 * force / mass * dt,
            max_relative = 1e-12
        );
        assert_eq!(body.velocity_history().len(), n + 1);
        assert_eq!(body.position_history().len(), n + 1);
        assert_eq!(body.acceleration_history().len(), n + 1);
    }

    #[test]
    fn negative_force_reverses_without_bounds() {
        let mut body = MassBody::new(1.0).unwrap();
        for _ in 0..3 {
            body.integrate(-1.0, 1.0);
        }
        assert_eq!(body.velocity(), -3.0);
        assert_eq!(body.position(), -6.0);
    }
}
