//! Location — resolved coordinates for a summit reference or a skimmer
//! spotter, together with how they were obtained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a location was obtained. The resolver's cache-freshness rule depends
/// on this tag: only `CachedExternal` entries short-circuit the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationSource {
  /// Returned by the external lookup collaborator with direct coordinates.
  CachedExternal,
  /// Decoded from a grid locator string.
  GeometricDecode,
  /// Estimated from the static callsign-prefix table.
  StaticTable,
}

impl LocationSource {
  pub fn as_str(self) -> &'static str {
    match self {
      LocationSource::CachedExternal => "cached-external",
      LocationSource::GeometricDecode => "geometric-decode",
      LocationSource::StaticTable => "static-table",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "cached-external" => Ok(LocationSource::CachedExternal),
      "geometric-decode" => Ok(LocationSource::GeometricDecode),
      "static-table" => Ok(LocationSource::StaticTable),
      other => Err(Error::UnknownLocationSource(other.to_string())),
    }
  }
}

/// Coordinates for a normalized subject identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  /// Normalized subject id — see [`normalize_subject`].
  pub subject:     String,
  pub latitude:    f64,
  pub longitude:   f64,
  /// Human-readable label (operator name, region, summit name, ...).
  pub label:       String,
  pub source:      LocationSource,
  pub resolved_at: DateTime<Utc>,
}

/// Normalize a subject identifier for cache keying: uppercase, and strip the
/// `-N` instance suffix skimmer spotters carry (`W3LPL-#`, `DK9IP-1`).
///
/// Summit references (`W4G/NG-001`) contain a `/` and are left intact apart
/// from case.
pub fn normalize_subject(subject: &str) -> String {
  let subject = subject.trim().to_uppercase();
  if subject.contains('/') {
    return subject;
  }
  match subject.split_once('-') {
    Some((base, _)) => base.to_string(),
    None => subject,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn spotter_instance_suffix_is_stripped() {
    assert_eq!(normalize_subject("W3LPL-#"), "W3LPL");
    assert_eq!(normalize_subject("dk9ip-1"), "DK9IP");
  }

  #[test]
  fn summit_reference_keeps_its_dash() {
    assert_eq!(normalize_subject("W4G/NG-001"), "W4G/NG-001");
  }

  #[test]
  fn plain_callsign_is_uppercased() {
    assert_eq!(normalize_subject(" k1abc "), "K1ABC");
  }
}
