//! Trip direction heuristic.
//!
//! Decides whether a trip travels roughly towards the rider's destination by
//! comparing the bearing of its first-to-last stop with the bearing of the
//! rider's start-to-destination line. Only the endpoints of the stop sequence
//! are used, so a looping trip is judged by its net displacement.

use crate::domain::Coordinate;
use crate::geo::bearing;

/// Largest accepted difference between trip and desired bearing, in degrees.
pub const MAX_DEVIATION_DEG: f64 = 90.0;

/// Smallest angle between two compass bearings, in degrees within [0, 180].
///
/// # Examples
///
/// ```
/// use departures_server::direction::angle_between;
///
/// assert_eq!(angle_between(10.0, 350.0), 20.0);
/// assert_eq!(angle_between(90.0, 270.0), 180.0);
/// ```
pub fn angle_between(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Returns true if a trip through `trip_stops` heads towards `end` from `start`.
///
/// Trips with fewer than two stops cannot be judged and are always accepted.
/// Perpendicular travel (exactly 90 degrees off) counts as heading towards
/// the destination; only travel into the opposite half-plane is rejected.
pub fn is_heading_towards(start: Coordinate, end: Coordinate, trip_stops: &[Coordinate]) -> bool {
    let [first, .., last] = trip_stops else {
        return true;
    };

    let desired = bearing(start, end);
    let trip = bearing(*first, *last);

    angle_between(desired, trip) <= MAX_DEVIATION_DEG
}
