//! Web layer for the departures service.
//!
//! Provides the HTTP query endpoint over the departure search.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
