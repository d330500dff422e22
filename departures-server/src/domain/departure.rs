//! Departure search results.

use chrono::NaiveDateTime;

use super::{Coordinate, StopVisit};

/// A departure of one trip from a stop near the requested start point.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub trip_id: String,
    pub route_id: String,
    pub headsign: String,
    pub stop: DepartureStop,
}

/// The stop a [`Departure`] leaves from, with absolute times.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureStop {
    pub name: String,
    pub coordinate: Coordinate,
    pub arrival: NaiveDateTime,
    pub departure: NaiveDateTime,
}

impl Departure {
    /// Build a departure from a visit, with times already anchored to a date.
    pub fn from_visit(visit: &StopVisit, arrival: NaiveDateTime, departure: NaiveDateTime) -> Self {
        Self {
            trip_id: visit.trip_id.clone(),
            route_id: visit.route_id.clone(),
            headsign: visit.headsign.clone(),
            stop: DepartureStop {
                name: visit.stop_name.clone(),
                coordinate: visit.coordinate,
                arrival,
                departure,
            },
        }
    }
}
