//! Feed line grammars for Ridgeline.
//!
//! Pipeline, per feed:
//!   raw line
//!     └─ grammar regex (named capture groups) → raw fields
//!          └─ numeric/time validation → `New*Spot` draft or `Rejection`
//!
//! Parsing is pure: the caller supplies `now` so hour/minute resolution is
//! deterministic and testable. Parsers never panic on malformed input; every
//! failure is a [`Rejection`] the reader loop logs and drops.

mod activation;
mod skimmer;
mod time;

pub mod error;

pub use activation::parse_activation;
pub use error::{Rejection, Result};
pub use skimmer::parse_skimmer;
pub use time::resolve_hhmm;
