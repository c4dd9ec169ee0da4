//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 UTC strings with whole-second precision and a
//! trailing `Z`, so `ORDER BY` and string comparison behave chronologically.
//! Booleans are stored as 0/1 integers; the location source tag as its
//! kebab-case string form.

use chrono::{DateTime, SecondsFormat, Utc};
use ridgeline_core::{
  location::{Location, LocationSource},
  path::{MatchedPair, SpotMatch},
  spot::{ActivationSpot, SkimmerSpot},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `activation_spots` row.
pub struct RawActivation {
  pub id:            i64,
  pub callsign:      String,
  pub frequency_khz: f64,
  pub summit:        String,
  pub spotter:       String,
  pub observed_at:   String,
  pub comment:       String,
}

impl RawActivation {
  pub fn into_spot(self) -> Result<ActivationSpot> {
    Ok(ActivationSpot {
      id:            self.id,
      callsign:      self.callsign,
      frequency_khz: self.frequency_khz,
      summit:        self.summit,
      spotter:       self.spotter,
      observed_at:   decode_dt(&self.observed_at)?,
      comment:       self.comment,
    })
  }
}

/// Raw values read directly from a `skimmer_spots` row.
pub struct RawSkimmer {
  pub id:                 i64,
  pub callsign:           String,
  pub frequency_khz:      f64,
  pub snr_db:             i32,
  pub mode:               String,
  pub spotter:            String,
  pub observed_at:        String,
  pub is_target:          bool,
  pub activation_matched: bool,
  pub retain_permanently: bool,
}

impl RawSkimmer {
  pub fn into_spot(self) -> Result<SkimmerSpot> {
    Ok(SkimmerSpot {
      id:                 self.id,
      callsign:           self.callsign,
      frequency_khz:      self.frequency_khz,
      snr_db:             self.snr_db,
      mode:               self.mode,
      spotter:            self.spotter,
      observed_at:        decode_dt(&self.observed_at)?,
      is_target:          self.is_target,
      activation_matched: self.activation_matched,
      retain_permanently: self.retain_permanently,
    })
  }
}

/// Raw values for a `matches` row joined with both spot tables.
pub struct RawMatchedPair {
  pub match_id:       i64,
  pub time_diff_secs: i64,
  pub freq_diff_hz:   i64,
  pub correlated_at:  String,
  pub activation:     RawActivation,
  pub skimmer:        RawSkimmer,
}

impl RawMatchedPair {
  pub fn into_pair(self) -> Result<MatchedPair> {
    let activation = self.activation.into_spot()?;
    let skimmer = self.skimmer.into_spot()?;
    Ok(MatchedPair {
      spot_match: SpotMatch {
        id:             self.match_id,
        activation_id:  activation.id,
        skimmer_id:     skimmer.id,
        time_diff_secs: self.time_diff_secs,
        freq_diff_hz:   self.freq_diff_hz,
        correlated_at:  decode_dt(&self.correlated_at)?,
      },
      activation,
      skimmer,
    })
  }
}

/// Raw values read directly from a `locations` row.
pub struct RawLocation {
  pub subject:     String,
  pub latitude:    f64,
  pub longitude:   f64,
  pub label:       String,
  pub source:      String,
  pub resolved_at: String,
}

impl RawLocation {
  pub fn into_location(self) -> Result<Location> {
    Ok(Location {
      subject:     self.subject,
      latitude:    self.latitude,
      longitude:   self.longitude,
      label:       self.label,
      source:      LocationSource::parse(&self.source)?,
      resolved_at: decode_dt(&self.resolved_at)?,
    })
  }
}
