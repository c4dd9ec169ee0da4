//! Rejection type for `ridgeline-parse`.
//!
//! A rejection is not a fault: feeds interleave spots with prompts, banners
//! and chatter, and every line that is not a well-formed spot is simply
//! dropped by the caller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  /// The line does not match the feed grammar at all (prompt, banner, ...).
  #[error("line does not match the feed grammar")]
  NoMatch,

  /// The frequency group matched but is not a parseable number.
  #[error("malformed frequency field: {0:?}")]
  BadFrequency(String),

  /// The time-of-day group matched but is not a valid hour/minute.
  #[error("malformed time-of-day field: {0:?}")]
  BadTime(String),
}

pub type Result<T, E = Rejection> = std::result::Result<T, E>;
