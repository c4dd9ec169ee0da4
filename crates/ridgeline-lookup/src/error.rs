//! Error type for `ridgeline-lookup`.
//!
//! Lookup failures (variants `Http`, `Xml`, `SessionRejected`,
//! `NoCredentials`) are caught inside the resolver chain and demoted to a
//! fall-through; only `Store` escapes [`resolve`], since a broken cache is
//! infrastructure trouble rather than a missing location.
//!
//! [`resolve`]: crate::resolver::LocationResolver::resolve

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("lookup credentials not configured")]
  NoCredentials,

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("xml error: {0}")]
  Xml(#[from] quick_xml::DeError),

  #[error("session rejected: {0}")]
  SessionRejected(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
