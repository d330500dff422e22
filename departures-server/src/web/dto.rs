//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, Departure, format_utc};

/// Query string of the closest departures endpoint.
///
/// Every field is read as an optional string so that presence and format
/// can be checked separately and reported with specific messages.
#[derive(Debug, Default, Deserialize)]
pub struct DeparturesQuery {
    /// Start point as "lat,lon"
    pub start_coordinates: Option<String>,

    /// Destination as "lat,lon"
    pub end_coordinates: Option<String>,

    /// ISO 8601 start time (defaults to now)
    pub start_time: Option<String>,

    /// Maximum number of departures
    pub limit: Option<String>,
}

impl DeparturesQuery {
    /// Look up a parameter, treating an empty value as absent.
    pub fn param<'a>(value: &'a Option<String>) -> Option<&'a str> {
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Successful closest departures response.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeparturesResponse {
    pub metadata: Metadata,
    pub departures: Vec<DepartureResult>,
}

/// Description of the request that produced a response.
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Request path and query
    #[serde(rename = "self")]
    pub self_link: String,

    /// City as given in the path
    pub city: String,

    pub query_parameters: QueryParameters,
}

/// Effective query parameters after defaults are applied.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryParameters {
    /// Start point exactly as received
    pub start_coordinates: String,

    /// Destination exactly as received
    pub end_coordinates: String,

    /// Normalized start time
    pub start_time: String,

    pub limit: usize,
}

/// A departure in search results.
#[derive(Debug, Serialize, Deserialize)]
pub struct DepartureResult {
    pub trip_id: String,
    pub route_id: String,

    /// Destination shown on the vehicle
    pub trip_headsign: String,

    pub stop: StopResult,
}

/// The stop a departure leaves from.
#[derive(Debug, Serialize, Deserialize)]
pub struct StopResult {
    pub name: String,
    pub coordinates: CoordinatesResult,

    /// Scheduled arrival, "YYYY-MM-DDTHH:MM:SSZ"
    pub arrival_time: String,

    /// Scheduled departure, "YYYY-MM-DDTHH:MM:SSZ"
    pub departure_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoordinatesResult {
    pub latitude: f64,
    pub longitude: f64,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl From<Coordinate> for CoordinatesResult {
    fn from(c: Coordinate) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

impl DepartureResult {
    /// Create from a domain Departure.
    pub fn from_departure(departure: &Departure) -> Self {
        Self {
            trip_id: departure.trip_id.clone(),
            route_id: departure.route_id.clone(),
            trip_headsign: departure.headsign.clone(),
            stop: StopResult {
                name: departure.stop.name.clone(),
                coordinates: departure.stop.coordinate.into(),
                arrival_time: format_utc(&departure.stop.arrival),
                departure_time: format_utc(&departure.stop.departure),
            },
        }
    }
}
