//! Great-circle distance and bearing on a spherical Earth.

use crate::domain::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// # Examples
///
/// ```
/// use departures_server::domain::Coordinate;
/// use departures_server::geo::distance;
///
/// let a = Coordinate::new(51.1079, 17.0385);
/// let b = Coordinate::new(51.1141, 17.0301);
/// let d = distance(a, b);
/// assert!((d - 905.0).abs() < 5.0);
/// assert_eq!(distance(a, a), 0.0);
/// ```
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // near-antipodal rounding can push h just past 1
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial compass bearing from `a` to `b`, in degrees within [0, 360).
///
/// 0 is north, 90 east, 180 south, 270 west. Identical points give 0.
pub fn bearing(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    // result stays below 360.0; rem_euclid does not for tiny negatives
    (x.atan2(y).to_degrees() + 360.0) % 360.0
}
