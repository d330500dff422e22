//! Public transport departures server.
//!
//! A web service that answers: "I'm standing here and want to get there,
//! which vehicles leave nearby in the right direction?"

pub mod direction;
pub mod domain;
pub mod geo;
pub mod import;
pub mod schedule;
pub mod search;
pub mod web;
