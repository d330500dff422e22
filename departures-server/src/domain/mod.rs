//! Domain types for the departure search.
//!
//! Schedule records are typed at the store boundary so that the search never
//! looks fields up by name. Coordinates and times carry their own parsing and
//! validation.

mod coordinate;
mod departure;
mod schedule;
mod time;

pub use coordinate::{Coordinate, CoordinateFormatError};
pub use departure::{Departure, DepartureStop};
pub use schedule::{Stop, StopTime, StopVisit, Trip};
pub use time::{ServiceTime, TimeError, format_utc, parse_start_time};
