//! In-memory schedule store.
//!
//! Holds a complete schedule in plain collections. Useful for tests and small
//! fixtures where standing up a database would be overkill.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{Coordinate, ServiceTime, Stop, StopTime, StopVisit, Trip};

use super::{ScheduleStore, StoreError};

/// Schedule store backed by in-memory collections.
#[derive(Debug, Clone)]
pub struct InMemoryScheduleStore {
    stops: Arc<[Stop]>,
    stops_by_id: HashMap<String, usize>,
    trips: HashMap<String, Trip>,
    stop_times: Vec<StopTime>,
}

impl InMemoryScheduleStore {
    /// Create a store from stops, trips and stop times.
    pub fn new(stops: Vec<Stop>, trips: Vec<Trip>, stop_times: Vec<StopTime>) -> Self {
        let stops_by_id = stops
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        let trips = trips.into_iter().map(|t| (t.id.clone(), t)).collect();

        Self {
            stops: stops.into(),
            stops_by_id,
            trips,
            stop_times,
        }
    }

    /// Start building a store.
    pub fn builder() -> InMemoryScheduleStoreBuilder {
        InMemoryScheduleStoreBuilder::default()
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    async fn stops(&self) -> Result<Arc<[Stop]>, StoreError> {
        Ok(self.stops.clone())
    }

    async fn stop_visits(&self, stop_ids: &[String]) -> Result<Vec<StopVisit>, StoreError> {
        let wanted: HashSet<&str> = stop_ids.iter().map(String::as_str).collect();

        let mut visits: Vec<StopVisit> = self
            .stop_times
            .iter()
            .filter(|st| wanted.contains(st.stop_id.as_str()))
            .filter_map(|st| {
                // Inner join: stop times with unknown trips or stops are dropped
                let trip = self.trips.get(&st.trip_id)?;
                let stop = &self.stops[*self.stops_by_id.get(&st.stop_id)?];
                Some(StopVisit::join(st, trip, stop))
            })
            .collect();

        visits.sort_by(|a, b| {
            a.trip_id
                .cmp(&b.trip_id)
                .then(a.stop_sequence.cmp(&b.stop_sequence))
        });

        Ok(visits)
    }
}

/// Builder for [`InMemoryScheduleStore`].
///
/// Provides a fluent API for writing schedule fixtures.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStoreBuilder {
    stops: Vec<Stop>,
    trips: Vec<Trip>,
    stop_times: Vec<StopTime>,
}

impl InMemoryScheduleStoreBuilder {
    /// Add a stop.
    pub fn stop(mut self, id: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        self.stops
            .push(Stop::new(id, name, Coordinate::new(latitude, longitude)));
        self
    }

    /// Add a trip.
    pub fn trip(mut self, id: &str, route_id: &str, headsign: &str) -> Self {
        self.trips.push(Trip::new(id, route_id, headsign));
        self
    }

    /// Add a stop time.
    ///
    /// # Panics
    ///
    /// Panics if `arrival` or `departure` is not a valid "HH:MM:SS" time.
    pub fn stop_time(
        mut self,
        trip_id: &str,
        stop_id: &str,
        stop_sequence: u32,
        arrival: &str,
        departure: &str,
    ) -> Self {
        let parse = |field: &str, value: &str| match ServiceTime::parse(value) {
            Ok(time) => time,
            Err(e) => panic!("bad {field} {value:?} for trip {trip_id} at stop {stop_id}: {e}"),
        };

        self.stop_times.push(StopTime {
            trip_id: trip_id.to_string(),
            stop_id: stop_id.to_string(),
            stop_sequence,
            arrival: parse("arrival", arrival),
            departure: parse("departure", departure),
        });
        self
    }

    /// Build the store.
    pub fn build(self) -> InMemoryScheduleStore {
        InMemoryScheduleStore::new(self.stops, self.trips, self.stop_times)
    }
}
