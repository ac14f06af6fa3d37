//! Core units, constants, and shared primitives for the voyage twin workspace.

/// Physical and nautical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Metres per second in one knot.
    pub const KNOT_M_S: f64 = 0.514_444;
    /// Metres per international nautical mile.
    pub const NAUTICAL_MILE_M: f64 = 1_852.0;
    /// Kilograms per metric tonne.
    pub const TONNE_KG: f64 = 1_000.0;
    /// Seconds per minute.
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    /// Mean Earth radius used for great-circle distances (m).
    pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;
    /// WGS-84 semi-major axis (m).
    pub const WGS84_A: f64 = 6_378_137.0;
    /// WGS-84 flattening.
    pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{KNOT_M_S, NAUTICAL_MILE_M, SECONDS_PER_MINUTE, TONNE_KG};

    /// Convert knots to metres per second.
    #[inline]
    pub fn knots_to_ms(v: f64) -> f64 {
        v * KNOT_M_S
    }

    /// Convert metres per second to knots.
    #[inline]
    pub fn ms_to_knots(v: f64) -> f64 {
        v / KNOT_M_S
    }

    /// Convert metric tonnes to kilograms.
    #[inline]
    pub fn tonnes_to_kg(m: f64) -> f64 {
        m * TONNE_KG
    }

    /// Convert metres to nautical miles.
    #[inline]
    pub fn m_to_nmi(d: f64) -> f64 {
        d / NAUTICAL_MILE_M
    }

    /// Convert seconds to minutes.
    #[inline]
    pub fn seconds_to_minutes(t: f64) -> f64 {
        t / SECONDS_PER_MINUTE
    }
}

/// Distances between geographic coordinates given in degrees.
pub mod geo;
