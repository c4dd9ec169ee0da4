//! Core types and trait definitions for the Ridgeline spot matcher.
//!
//! This crate is deliberately free of network and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than chrono.

pub mod error;
pub mod geo;
pub mod location;
pub mod path;
pub mod spot;
pub mod store;

pub use error::{Error, Result};
