//! HTTP route handlers.

use std::any::Any;

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::{Coordinate, format_utc, parse_start_time};
use crate::schedule::ScheduleStore;
use crate::search::{SearchError, SearchRequest, search};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S: ScheduleStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(index::<S>))
        .route("/health", get(health))
        .route(
            "/public_transport/city/:city/closest_departures",
            get(closest_departures::<S>),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Landing text naming the served city.
async fn index<S: ScheduleStore + 'static>(State(state): State<AppState<S>>) -> String {
    format!(
        "Public transport departures API. Try \
         /public_transport/city/{}/closest_departures?start_coordinates=lat,lon&end_coordinates=lat,lon",
        state.city
    )
}

/// Find departures near a start point heading towards a destination.
async fn closest_departures<S: ScheduleStore + 'static>(
    State(state): State<AppState<S>>,
    Path(city): Path<String>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<DeparturesQuery>,
) -> Result<Json<DeparturesResponse>, AppError> {
    if !state.serves(&city) {
        return Err(AppError::NotFound {
            message: "City not supported".into(),
        });
    }

    let start_raw = required(&query.start_coordinates, "start_coordinates")?;
    let end_raw = required(&query.end_coordinates, "end_coordinates")?;

    let (start, end) = match (Coordinate::parse(start_raw), Coordinate::parse(end_raw)) {
        (Ok(start), Ok(end)) => (start, end),
        _ => {
            return Err(AppError::BadRequest {
                message: "Invalid coordinate format. Expected: \"lat,lon\"".into(),
            });
        }
    };

    let start_time = match DeparturesQuery::param(&query.start_time) {
        Some(raw) => parse_start_time(raw).map_err(|_| AppError::BadRequest {
            message: "Invalid start_time format. Expected ISO 8601".into(),
        })?,
        None => Utc::now().naive_utc(),
    };

    let limit = match DeparturesQuery::param(&query.limit) {
        Some(raw) => parse_limit(raw).ok_or_else(|| AppError::BadRequest {
            message: SearchError::InvalidLimit.to_string(),
        })?,
        None => state.config.default_limit,
    };

    let request = SearchRequest::new(start, end, start_time, &state.config).with_limit(limit);
    let departures = search(state.store.as_ref(), &request).await?;

    debug!(city = %state.city, found = departures.len(), "closest departures");

    let self_link = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str())
        .trim_end_matches('?')
        .to_string();

    Ok(Json(DeparturesResponse {
        metadata: Metadata {
            self_link,
            city,
            query_parameters: QueryParameters {
                start_coordinates: start_raw.to_string(),
                end_coordinates: end_raw.to_string(),
                start_time: format_utc(&start_time),
                limit,
            },
        },
        departures: departures
            .iter()
            .map(DepartureResult::from_departure)
            .collect(),
    }))
}

/// A required, non-empty query parameter.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    DeparturesQuery::param(value).ok_or_else(|| AppError::BadRequest {
        message: format!("Missing required parameter: {name}"),
    })
}

/// Parse a positive integer limit.
fn parse_limit(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    error!(%detail, "request handler panicked");

    let body = Json(ErrorResponse {
        error: "Internal server error".into(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidCoordinates { .. }
            | SearchError::InvalidLimit
            | SearchError::InvalidRadius => AppError::BadRequest {
                message: e.to_string(),
            },
            SearchError::Store(e) => AppError::Internal {
                message: format!("Database error: {e}"),
            },
            SearchError::TimeOutOfRange(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
