//! Prime-mover model: the commanded thrust and its per-step history.

/// Thrust source with no internal dynamics; the applied force is whatever was last commanded.
#[derive(Debug, Clone)]
pub struct PropulsionUnit {
    max_force_newtons: f64,
    force_newtons: f64,
    history: Vec<f64>,
}

impl Default for PropulsionUnit {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PropulsionUnit {
    /// Unit with an initial command and no force limit.
    pub fn new(initial_force_newtons: f64) -> Self {
        Self::with_limit(initial_force_newtons, f64::INFINITY)
    }

    /// Unit whose commands are clamped to `±max_force_newtons`.
    pub fn with_limit(initial_force_newtons: f64, max_force_newtons: f64) -> Self {
        let max = if max_force_newtons.is_nan() {
            f64::INFINITY
        } else {
            max_force_newtons.abs()
        };
        let force = initial_force_newtons.clamp(-max, max);
        Self {
            max_force_newtons: max,
            force_newtons: force,
            history: vec![force],
        }
    }

    /// Command a new thrust. Takes effect from the next recorded step.
    pub fn set_force(&mut self, force_newtons: f64) {
        self.force_newtons = force_newtons.clamp(-self.max_force_newtons, self.max_force_newtons);
    }

    pub fn current_force(&self) -> f64 {
        self.force_newtons
    }

    pub fn max_force(&self) -> f64 {
        self.max_force_newtons
    }

    /// Append the current command to the history and return it as the step's driving force.
    pub fn record(&mut self) -> f64 {
        self.history.push(self.force_newtons);
        self.force_newtons
    }

    /// Initial value followed by one entry per recorded step.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn reserve(&mut self, additional: usize) {
        self.history.reserve(additional);
    }

    pub fn into_history(self) -> Vec<f64> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_unit_passes_commands_through() {
        let mut unit = PropulsionUnit::default();
        unit.set_force(-2.5e6);
        assert_eq!(unit.current_force(), -2.5e6);
        assert!(unit.max_force().is_infinite());
    }

    #[test]
    fn history_grows_only_when_recorded() {
        let mut unit = PropulsionUnit::new(10.0);
        unit.set_force(20.0);
        unit.set_force(30.0);
        assert_eq!(unit.history(), &[10.0]);
        assert_eq!(unit.record(), 30.0);
        assert_eq!(unit.record(), 30.0);
        assert_eq!(unit.history(), &[10.0, 30.0, 30.0]);
    }

    #[test]
    fn limit_clamps_both_directions() {
        let mut unit = PropulsionUnit::with_limit(500.0, 100.0);
        assert_eq!(unit.current_force(), 100.0);
        unit.set_force(-250.0);
        assert_eq!(unit.current_force(), -100.0);
    }
}
