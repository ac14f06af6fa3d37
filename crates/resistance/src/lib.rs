//! Sampled speed → resistance curves.
//!
//! A [`ResistanceTable`] stores `(speed, coefficient)` samples sorted by speed
//! and answers drag queries by piecewise-linear interpolation on the speed
//! axis. Queries outside the sampled range follow an explicit
//! [`ExtrapolationPolicy`] so that behaviour at the table edges is always
//! deterministic.

use std::cmp::Ordering;

use thiserror::Error;

/// One sampled point of the resistance curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistanceSample {
    /// Ship speed through the water (m/s).
    pub speed_m_s: f64,
    /// Opposing force magnitude at that speed (N).
    pub coefficient: f64,
}

impl ResistanceSample {
    pub fn new(speed_m_s: f64, coefficient: f64) -> Self {
        Self {
            speed_m_s,
            coefficient,
        }
    }
}

/// Behaviour for speeds below the first or above the last sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtrapolationPolicy {
    /// Hold the nearest edge coefficient.
    #[default]
    Clamp,
    /// Extend the nearest edge segment linearly.
    Linear,
}

/// Where a query landed relative to the sampled speed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Within,
    Below,
    Above,
}

/// Result of a drag query with its domain classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragLookup {
    pub coefficient: f64,
    pub domain: Domain,
}

impl DragLookup {
    pub fn is_extrapolated(&self) -> bool {
        self.domain != Domain::Within
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ResistanceError {
    #[error("resistance table has no samples")]
    Empty,
    #[error("resistance sample {index} is not finite (speed={speed}, coefficient={coefficient})")]
    NonFinite {
        index: usize,
        speed: f64,
        coefficient: f64,
    },
    #[error("resistance table lists speed {speed} m/s more than once")]
    DuplicateSpeed { speed: f64 },
}

/// Speed-indexed resistance curve.
#[derive(Debug, Clone)]
pub struct ResistanceTable {
    samples: Vec<ResistanceSample>,
    policy: ExtrapolationPolicy,
}

impl ResistanceTable {
    /// Build a table from samples in any order, using the default clamping policy.
    pub fn new(samples: Vec<ResistanceSample>) -> Result<Self, ResistanceError> {
        Self::with_policy(samples, ExtrapolationPolicy::default())
    }

    /// Build a table with an explicit extrapolation policy.
    pub fn with_policy(
        mut samples: Vec<ResistanceSample>,
        policy: ExtrapolationPolicy,
    ) -> Result<Self, ResistanceError> {
        if samples.is_empty() {
            return Err(ResistanceError::Empty);
        }
        if let Some((index, s)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !s.speed_m_s.is_finite() || !s.coefficient.is_finite())
        {
            return Err(ResistanceError::NonFinite {
                index,
                speed: s.speed_m_s,
                coefficient: s.coefficient,
            });
        }
        samples.sort_by(|a, b| a.speed_m_s.total_cmp(&b.speed_m_s));
        if let Some(pair) = samples
            .windows(2)
            .find(|pair| pair[0].speed_m_s == pair[1].speed_m_s)
        {
            return Err(ResistanceError::DuplicateSpeed {
                speed: pair[0].speed_m_s,
            });
        }
        Ok(Self { samples, policy })
    }

    /// Convenience constructor from `(speed, coefficient)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, ResistanceError> {
        Self::new(
            pairs
                .iter()
                .map(|&(speed, coefficient)| ResistanceSample::new(speed, coefficient))
                .collect(),
        )
    }

    pub fn samples(&self) -> &[ResistanceSample] {
        &self.samples
    }

    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    /// Sampled speed range `(min, max)` in m/s.
    pub fn speed_range(&self) -> (f64, f64) {
        let first = self.samples[0].speed_m_s;
        let last = self.samples[self.samples.len() - 1].speed_m_s;
        (first, last)
    }

    /// Resistance at `speed` (N).
    pub fn drag(&self, speed: f64) -> f64 {
        self.lookup(speed).coefficient
    }

    /// Resistance at `speed` together with the domain it was evaluated in.
    pub fn lookup(&self, speed: f64) -> DragLookup {
        let samples = &self.samples;
        let (min, max) = self.speed_range();

        if speed.is_nan() {
            return DragLookup {
                coefficient: f64::NAN,
                domain: Domain::Within,
            };
        }
        if speed < min {
            return DragLookup {
                coefficient: self.edge_value(speed, 0),
                domain: Domain::Below,
            };
        }
        if speed > max {
            return DragLookup {
                coefficient: self.edge_value(speed, samples.len() - 1),
                domain: Domain::Above,
            };
        }

        // partial_cmp so that -0.0 matches a 0.0 sample
        let coefficient = match samples.binary_search_by(|s| {
            s.speed_m_s.partial_cmp(&speed).unwrap_or(Ordering::Less)
        }) {
            Ok(idx) => samples[idx].coefficient,
            // speed lies strictly between samples[idx - 1] and samples[idx]
            Err(idx) => interpolate(&samples[idx - 1], &samples[idx], speed),
        };
        DragLookup {
            coefficient,
            domain: Domain::Within,
        }
    }

    fn edge_value(&self, speed: f64, edge: usize) -> f64 {
        let samples = &self.samples;
        match self.policy {
            ExtrapolationPolicy::Clamp => samples[edge].coefficient,
            ExtrapolationPolicy::Linear if samples.len() < 2 => samples[edge].coefficient,
            ExtrapolationPolicy::Linear => {
                let (lo, hi) = if edge == 0 {
                    (&samples[0], &samples[1])
                } else {
                    (&samples[edge - 1], &samples[edge])
                };
                interpolate(lo, hi, speed)
            }
        }
    }
}

#[inline]
fn interpolate(lo: &ResistanceSample, hi: &ResistanceSample, speed: f64) -> f64 {
    let t = (speed - lo.speed_m_s) / (hi.speed_m_s - lo.speed_m_s);
    lo.coefficient + t * (hi.coefficient - lo.coefficient)
}
