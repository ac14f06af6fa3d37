use crate::constants::{EARTH_MEAN_RADIUS_M, WGS84_A, WGS84_F};

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl LatLon {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }
}

/// How the length of a leg between two coordinates is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceModel {
    /// Haversine distance on a sphere of mean Earth radius.
    #[default]
    GreatCircle,
    /// Vincenty inverse solution on the WGS-84 ellipsoid.
    Ellipsoidal,
}

impl DistanceModel {
    /// Distance in metres between `from` and `to`.
    ///
    /// The ellipsoidal model falls back to the great-circle value when the
    /// Vincenty iteration does not converge (nearly antipodal points).
    pub fn distance_m(self, from: LatLon, to: LatLon) -> f64 {
        match self {
            DistanceModel::GreatCircle => great_circle_m(from, to),
            DistanceModel::Ellipsoidal => {
                vincenty_m(from, to).unwrap_or_else(|| great_circle_m(from, to))
            }
        }
    }
}

/// Haversine great-circle distance (m).
pub fn great_circle_m(from: LatLon, to: LatLon) -> f64 {
    let phi1 = from.lat_deg.to_radians();
    let phi2 = to.lat_deg.to_radians();
    let dphi = (to.lat_deg - from.lat_deg).to_radians();
    let dlambda = (to.lon_deg - from.lon_deg).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_MEAN_RADIUS_M * c
}

/// Vincenty inverse distance on WGS-84 (m). `None` if the iteration fails to converge.
pub fn vincenty_m(from: LatLon, to: LatLon) -> Option<f64> {
    const MAX_ITERATIONS: usize = 200;
    const TOLERANCE: f64 = 1e-12;

    let a = WGS84_A;
    let f = WGS84_F;
    let b = (1.0 - f) * a;

    let l = (to.lon_deg - from.lon_deg).to_radians();
    let u1 = ((1.0 - f) * from.lat_deg.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * to.lat_deg.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // coincident points
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // equatorial line: cos_sq_alpha = 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - lambda_prev).abs() < TOLERANCE {
            let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
            let big_a =
                1.0 + u_sq / 16_384.0 * (4_096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1_024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(b * big_a * (sigma - delta_sigma));
        }
    }
    None
}
