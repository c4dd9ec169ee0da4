//! Error type for `ridgeline-feed`.
//!
//! Every variant here is a transport error: recovered locally by the
//! reconnect state machine, logged, and never surfaced beyond the reader
//! loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not connected")]
  NotConnected,

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
