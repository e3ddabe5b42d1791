//! Geodesic utilities for presentation consumers
//!
//! Closed-form spherical formulas for turning geofenced target
//! coordinates into dial and radar angles. These are consumed by the
//! engine's callers; the fusion core itself never touches coordinates.

/// Mean Earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate from degrees
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance in meters, by the spherical law of cosines
///
/// # Example
/// ```
/// use heading_fusion::geo::{Coordinate, distance_m};
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.0, 1.0);
/// assert!((distance_m(a, b) - 111_195.0).abs() < 10.0);
/// ```
pub fn distance_m(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lon - from.lon).to_radians();

    let central = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * delta_lambda.cos();
    // Rounding can push the argument just past ±1 for identical points
    EARTH_RADIUS_M * central.clamp(-1.0, 1.0).acos()
}

/// Initial bearing (forward azimuth) from `from` to `to`, in [0°, 360°)
///
/// # Example
/// ```
/// use heading_fusion::geo::{Coordinate, initial_bearing};
///
/// let origin = Coordinate::new(0.0, 0.0);
/// let east = Coordinate::new(0.0, 1.0);
/// assert!((initial_bearing(origin, east) - 90.0).abs() < 1e-6);
/// ```
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lon - from.lon).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Point reached by travelling `distance_m` meters on `bearing` degrees
pub fn destination(from: Coordinate, bearing: f64, distance_m: f64) -> Coordinate {
    let phi1 = from.lat.to_radians();
    let lambda1 = from.lon.to_radians();
    let theta = bearing.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    Coordinate {
        lat: phi2.to_degrees(),
        lon: (lambda2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0,
    }
}
