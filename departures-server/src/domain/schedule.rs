//! Static schedule records.
//!
//! These are loaded once and never change while the service runs.

use super::{Coordinate, ServiceTime};

/// A physical boarding location.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
}

impl Stop {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate,
        }
    }
}

/// One scheduled run of a vehicle along a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: String,
    pub route_id: String,
    /// Rider-facing destination text.
    pub headsign: String,
}

impl Trip {
    pub fn new(
        id: impl Into<String>,
        route_id: impl Into<String>,
        headsign: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            route_id: route_id.into(),
            headsign: headsign.into(),
        }
    }
}

/// A scheduled arrival/departure of one trip at one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub arrival: ServiceTime,
    pub departure: ServiceTime,
}

/// A stop time joined with its trip and stop.
///
/// This is the row shape the departure search consumes: everything needed to
/// judge a trip's direction and to render a departure, without further lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct StopVisit {
    pub trip_id: String,
    pub route_id: String,
    pub headsign: String,
    pub stop_id: String,
    pub stop_name: String,
    pub coordinate: Coordinate,
    pub stop_sequence: u32,
    pub arrival: ServiceTime,
    pub departure: ServiceTime,
}

impl StopVisit {
    /// Join a stop time with its trip and stop.
    pub fn join(stop_time: &StopTime, trip: &Trip, stop: &Stop) -> Self {
        Self {
            trip_id: trip.id.clone(),
            route_id: trip.route_id.clone(),
            headsign: trip.headsign.clone(),
            stop_id: stop.id.clone(),
            stop_name: stop.name.clone(),
            coordinate: stop.coordinate,
            stop_sequence: stop_time.stop_sequence,
            arrival: stop_time.arrival,
            departure: stop_time.departure,
        }
    }
}
