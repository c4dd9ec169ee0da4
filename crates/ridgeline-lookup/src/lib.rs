//! Location resolution for Ridgeline.
//!
//! [`LocationResolver`] turns a summit reference or skimmer spotter callsign
//! into coordinates through an ordered fallback chain: cache, external XML
//! lookup, grid-locator decode, static prefix table. Exhausting the chain is
//! a normal outcome (`None`), never an error — a path with an unresolvable
//! endpoint is simply skipped by callers.

pub mod client;
pub mod error;
pub mod resolver;
pub mod session;

pub use client::{LookupClient, LookupConfig, LookupRecord};
pub use error::{Error, Result};
pub use resolver::LocationResolver;
