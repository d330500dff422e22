//! Departure search.
//!
//! This module implements the core query of the service: "which departures
//! near me head towards my destination?"
//!
//! The search filters stops by distance, trips by direction and stop times by
//! the requested start time, then orders what is left by distance from the
//! rider.

mod config;
mod engine;

pub use config::{InvalidSearchConfig, SearchConfig};
pub use engine::{
    DepartureSearch, Endpoint, NearbyStop, SearchError, SearchRequest, nearby_stops, search,
};
