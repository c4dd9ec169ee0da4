//! Spot types — the two normalized event kinds Ridgeline ingests.
//!
//! An activation spot reports an operator transmitting from a summit; a
//! skimmer spot reports an automated receiver hearing a callsign. Both are
//! immutable once stored, except for the skimmer retention flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Activation spots ────────────────────────────────────────────────────────

/// A parsed activation spot, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivationSpot {
  pub callsign:      String,
  pub frequency_khz: f64,
  pub summit:        String,
  /// The station that reported the spot, not the activator.
  pub spotter:       String,
  pub observed_at:   DateTime<Utc>,
  pub comment:       String,
}

/// A persisted activation spot. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationSpot {
  pub id:            i64,
  pub callsign:      String,
  pub frequency_khz: f64,
  pub summit:        String,
  pub spotter:       String,
  pub observed_at:   DateTime<Utc>,
  pub comment:       String,
}

// ─── Skimmer spots ───────────────────────────────────────────────────────────

/// A parsed skimmer spot, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSkimmerSpot {
  pub callsign:      String,
  pub frequency_khz: f64,
  pub snr_db:        i32,
  pub mode:          String,
  pub spotter:       String,
  pub observed_at:   DateTime<Utc>,
}

/// A persisted skimmer spot with its retention flags.
///
/// `retain_permanently` is monotonic: once set it is never cleared, even if a
/// later correlation cycle no longer produces the match that set it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkimmerSpot {
  pub id:                 i64,
  pub callsign:           String,
  pub frequency_khz:      f64,
  pub snr_db:             i32,
  pub mode:               String,
  pub spotter:            String,
  pub observed_at:        DateTime<Utc>,
  pub is_target:          bool,
  pub activation_matched: bool,
  pub retain_permanently: bool,
}

// ─── Target-callsign matching ────────────────────────────────────────────────

/// Whether `heard` is the configured target callsign, tolerating portable
/// suffixes (`/P`, `/M`, `/QRP`, ...) on either side.
pub fn is_target_callsign(heard: &str, target: &str) -> bool {
  if target.is_empty() {
    return false;
  }

  let heard = heard.trim().to_uppercase();
  let target = target.trim().to_uppercase();

  if heard == target {
    return true;
  }

  let heard_base = heard.split('/').next().unwrap_or(&heard);
  let target_base = target.split('/').next().unwrap_or(&target);

  heard_base == target_base || heard_base == target || heard == target_base
}
