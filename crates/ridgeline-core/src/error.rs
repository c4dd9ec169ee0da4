//! Error types for `ridgeline-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown location source tag: {0:?}")]
  UnknownLocationSource(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
