//! Match and propagation-path types — the derived read side of the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  location::Location,
  spot::{ActivationSpot, SkimmerSpot},
};

/// One correlated (activation, skimmer) pair.
///
/// The full match set is a pure function of the current spot tables and is
/// rebuilt wholesale every correlation cycle; rows never survive a cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotMatch {
  pub id:             i64,
  pub activation_id:  i64,
  pub skimmer_id:     i64,
  /// Skimmer minus activation, signed seconds.
  pub time_diff_secs: i64,
  /// Skimmer minus activation, signed Hz.
  pub freq_diff_hz:   i64,
  pub correlated_at:  DateTime<Utc>,
}

/// A match joined with both of its spots, as returned by
/// [`SpotStore::recent_matches`](crate::store::SpotStore::recent_matches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPair {
  pub spot_match: SpotMatch,
  pub activation: ActivationSpot,
  pub skimmer:    SkimmerSpot,
}

/// An inferred propagation path: a matched pair with both endpoints resolved
/// to coordinates. This is the row the external map layer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationPath {
  pub callsign:         String,
  pub summit:           String,
  pub summit_location:  Location,
  pub spotter:          String,
  pub spotter_location: Location,
  pub frequency_khz:    f64,
  pub snr_db:           i32,
  pub distance_km:      f64,
  pub observed_at:      DateTime<Utc>,
}

/// Summary statistics over a set of paths, for the periodic status log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathStats {
  pub total_paths:     usize,
  pub unique_summits:  usize,
  pub unique_spotters: usize,
  pub min_distance_km: f64,
  pub avg_distance_km: f64,
  pub max_distance_km: f64,
}

impl PathStats {
  pub fn from_paths(paths: &[PropagationPath]) -> Self {
    if paths.is_empty() {
      return Self::default();
    }

    let mut summits: Vec<&str> =
      paths.iter().map(|p| p.summit.as_str()).collect();
    summits.sort_unstable();
    summits.dedup();

    let mut spotters: Vec<&str> =
      paths.iter().map(|p| p.spotter.as_str()).collect();
    spotters.sort_unstable();
    spotters.dedup();

    let distances: Vec<f64> = paths.iter().map(|p| p.distance_km).collect();
    let sum: f64 = distances.iter().sum();

    Self {
      total_paths:     paths.len(),
      unique_summits:  summits.len(),
      unique_spotters: spotters.len(),
      min_distance_km: distances.iter().copied().fold(f64::INFINITY, f64::min),
      avg_distance_km: sum / distances.len() as f64,
      max_distance_km: distances.iter().copied().fold(0.0, f64::max),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::location::LocationSource;

  fn loc(subject: &str, lat: f64, lon: f64) -> Location {
    Location {
      subject:     subject.to_string(),
      latitude:    lat,
      longitude:   lon,
      label:       subject.to_string(),
      source:      LocationSource::StaticTable,
      resolved_at: Utc::now(),
    }
  }

  fn path(summit: &str, spotter: &str, distance_km: f64) -> PropagationPath {
    PropagationPath {
      callsign:         "W1AW/P".to_string(),
      summit:           summit.to_string(),
      summit_location:  loc(summit, 42.0, -71.0),
      spotter:          spotter.to_string(),
      spotter_location: loc(spotter, 47.0, -122.0),
      frequency_khz:    14062.0,
      snr_db:           15,
      distance_km,
      observed_at:      Utc::now(),
    }
  }

  #[test]
  fn stats_over_empty_set_are_zero() {
    let stats = PathStats::from_paths(&[]);
    assert_eq!(stats.total_paths, 0);
  }

  #[test]
  fn stats_count_unique_endpoints() {
    let paths = vec![
      path("W4G/NG-001", "W3LPL", 800.0),
      path("W4G/NG-001", "DK9IP", 6500.0),
      path("W7W/LC-001", "W3LPL", 3700.0),
    ];
    let stats = PathStats::from_paths(&paths);
    assert_eq!(stats.total_paths, 3);
    assert_eq!(stats.unique_summits, 2);
    assert_eq!(stats.unique_spotters, 2);
    assert!((stats.min_distance_km - 800.0).abs() < 1e-9);
    assert!((stats.max_distance_km - 6500.0).abs() < 1e-9);
  }
}
