//! Session key handling for the external lookup service.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// A session key issued by the lookup service, with its acquisition time.
#[derive(Debug, Clone)]
pub struct Session {
  pub key:         String,
  pub acquired_at: DateTime<Utc>,
}

impl Session {
  pub fn new(key: String, acquired_at: DateTime<Utc>) -> Self {
    Self { key, acquired_at }
  }

  /// Whether the key is still within its time-to-live at `now`.
  pub fn is_valid(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(self.acquired_at);
    age.num_seconds() >= 0 && age.num_seconds() < ttl.as_secs() as i64
  }
}
