//! Daemon wiring: configuration, feed ingest sinks, the periodic
//! correlation/retention engine, and the propagation-path read model.
//!
//! All domain logic lives in the library crates; this crate only parses
//! configuration into their types and drives their tasks.

pub mod config;
pub mod engine;
pub mod ingest;
pub mod report;

pub use config::DaemonConfig;
