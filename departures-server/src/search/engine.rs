//! Departure search algorithm.
//!
//! Finds trips leaving from stops near the rider that head roughly towards the
//! rider's destination. The steps are: filter stops by distance from the start
//! point, fetch every visit to those stops, drop trips heading the wrong way,
//! pick each remaining trip's first visit at or after the start time, then
//! order by walking distance and truncate.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::direction::is_heading_towards;
use crate::domain::{Coordinate, Departure, ServiceTime, Stop, StopVisit};
use crate::geo::distance;
use crate::schedule::{ScheduleStore, StoreError};

use super::config::SearchConfig;

/// Which end of the requested journey a coordinate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// Error from departure search.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// A coordinate is outside the valid latitude/longitude range
    #[error("Invalid {endpoint} coordinates")]
    InvalidCoordinates {
        endpoint: Endpoint,
        coordinate: Coordinate,
    },

    /// The result limit is not a positive number
    #[error("Invalid limit. Expected positive integer")]
    InvalidLimit,

    /// The search radius is negative or not a number
    #[error("Invalid radius. Expected non-negative distance in meters")]
    InvalidRadius,

    /// A scheduled time cannot be placed on the requested date
    #[error("start time out of range: {0}")]
    TimeOutOfRange(NaiveDateTime),

    /// The schedule store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request for departure search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Where the rider starts.
    pub start: Coordinate,

    /// Where the rider wants to go.
    pub end: Coordinate,

    /// When the rider starts. The date anchors scheduled times; the time of
    /// day is the earliest acceptable departure.
    pub start_time: NaiveDateTime,

    /// Maximum number of departures to return.
    pub limit: usize,

    /// Maximum distance from `start` to a departure stop (meters).
    pub radius_m: f64,
}

impl SearchRequest {
    /// Create a request using the configured default limit and radius.
    pub fn new(
        start: Coordinate,
        end: Coordinate,
        start_time: NaiveDateTime,
        config: &SearchConfig,
    ) -> Self {
        Self {
            start,
            end,
            start_time,
            limit: config.default_limit,
            radius_m: config.default_radius_m,
        }
    }

    /// Override the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Override the search radius.
    pub fn with_radius(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        for (endpoint, coordinate) in [(Endpoint::Start, self.start), (Endpoint::End, self.end)] {
            if !coordinate.is_valid() {
                return Err(SearchError::InvalidCoordinates {
                    endpoint,
                    coordinate,
                });
            }
        }

        if self.limit == 0 {
            return Err(SearchError::InvalidLimit);
        }

        if !self.radius_m.is_finite() || self.radius_m < 0.0 {
            return Err(SearchError::InvalidRadius);
        }

        Ok(())
    }
}

/// A stop within the search radius, with its distance from the start point.
#[derive(Debug, Clone, Copy)]
pub struct NearbyStop<'a> {
    pub stop: &'a Stop,
    pub distance_m: f64,
}

/// Stops within `radius_m` of `origin`, in input order.
pub fn nearby_stops(origin: Coordinate, stops: &[Stop], radius_m: f64) -> Vec<NearbyStop<'_>> {
    stops
        .iter()
        .filter_map(|stop| {
            let distance_m = distance(origin, stop.coordinate);
            (distance_m <= radius_m).then_some(NearbyStop { stop, distance_m })
        })
        .collect()
}

/// All visits of one trip to nearby stops, in stop sequence order.
struct TripVisits {
    visits: Vec<StopVisit>,
}

/// Group visits by trip, keeping trips in first-seen order.
fn group_by_trip(visits: Vec<StopVisit>) -> Vec<TripVisits> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<TripVisits> = Vec::new();

    for visit in visits {
        match index.get(&visit.trip_id) {
            Some(&i) => groups[i].visits.push(visit),
            None => {
                index.insert(visit.trip_id.clone(), groups.len());
                groups.push(TripVisits {
                    visits: vec![visit],
                });
            }
        }
    }

    for group in &mut groups {
        group.visits.sort_by_key(|v| v.stop_sequence);
    }

    groups
}

/// A departure paired with its sort key.
struct Candidate {
    distance_m: f64,
    departure: Departure,
}

/// Departure search over a schedule store.
pub struct DepartureSearch<'a, S: ScheduleStore> {
    store: &'a S,
}

impl<'a, S: ScheduleStore> DepartureSearch<'a, S> {
    /// Create a new search over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Find departures for `request`, nearest stop first.
    ///
    /// At most one departure is returned per trip, and never more than
    /// `request.limit` in total. Finding nothing is not an error.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Departure>, SearchError> {
        request.validate()?;

        let stops = self.store.stops().await?;
        let nearby = nearby_stops(request.start, &stops, request.radius_m);

        debug!(
            stops = stops.len(),
            nearby = nearby.len(),
            radius_m = request.radius_m,
            "spatial filter"
        );

        if nearby.is_empty() {
            return Ok(Vec::new());
        }

        let distances: HashMap<&str, f64> = nearby
            .iter()
            .map(|n| (n.stop.id.as_str(), n.distance_m))
            .collect();
        let stop_ids: Vec<String> = nearby.iter().map(|n| n.stop.id.clone()).collect();

        let visits = self.store.stop_visits(&stop_ids).await?;
        let trips = group_by_trip(visits);

        let not_before = ServiceTime::from_time_of_day(request.start_time.time());
        let service_date = request.start_time.date();

        let mut candidates = Vec::new();
        for trip in &trips {
            let path: Vec<Coordinate> = trip.visits.iter().map(|v| v.coordinate).collect();
            if !is_heading_towards(request.start, request.end, &path) {
                trace!(trip = %trip.visits[0].trip_id, "heading away from destination");
                continue;
            }

            let Some((visit, distance_m)) = trip.visits.iter().find_map(|v| {
                if v.departure < not_before {
                    return None;
                }
                distances.get(v.stop_id.as_str()).map(|d| (v, *d))
            }) else {
                continue;
            };

            let arrival = visit
                .arrival
                .on_service_day(service_date)
                .ok_or(SearchError::TimeOutOfRange(request.start_time))?;
            let departure = visit
                .departure
                .on_service_day(service_date)
                .ok_or(SearchError::TimeOutOfRange(request.start_time))?;

            candidates.push(Candidate {
                distance_m,
                departure: Departure::from_visit(visit, arrival, departure),
            });
        }

        debug!(
            trips = trips.len(),
            candidates = candidates.len(),
            "direction and time filter"
        );

        // Stable: equal distances keep trip order
        candidates.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        candidates.truncate(request.limit);

        Ok(candidates.into_iter().map(|c| c.departure).collect())
    }
}

/// Find departures for `request` in `store`.
pub async fn search<S: ScheduleStore>(
    store: &S,
    request: &SearchRequest,
) -> Result<Vec<Departure>, SearchError> {
    DepartureSearch::new(store).search(request).await
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
