//! Geographic primitives: Maidenhead grid decoding, great-circle distance,
//! and the static callsign-prefix fallback table.
//!
//! Everything here is a pure function; the resolver chain in
//! `ridgeline-lookup` layers caching and the external lookup on top.

// ─── Great-circle distance ───────────────────────────────────────────────────

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two `(lat, lon)` pairs in
/// degrees.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
  let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
  let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());

  let dlat = lat2 - lat1;
  let dlon = lon2 - lon1;

  let h = (dlat / 2.0).sin().powi(2)
    + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

  2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// ─── Maidenhead grid locators ────────────────────────────────────────────────

/// Decode a 4- or 6-character Maidenhead grid locator to the `(lat, lon)` of
/// the cell centre. Returns `None` for anything malformed.
pub fn grid_to_coordinates(grid: &str) -> Option<(f64, f64)> {
  let grid = grid.trim().to_uppercase();
  let bytes = grid.as_bytes();
  if bytes.len() < 4 {
    return None;
  }

  let field = |b: u8| -> Option<f64> {
    (b'A'..=b'R').contains(&b).then(|| f64::from(b - b'A'))
  };
  let digit = |b: u8| -> Option<f64> {
    b.is_ascii_digit().then(|| f64::from(b - b'0'))
  };

  let mut lon = -180.0 + field(bytes[0])? * 20.0 + digit(bytes[2])? * 2.0;
  let mut lat = -90.0 + field(bytes[1])? * 10.0 + digit(bytes[3])? * 1.0;

  if bytes.len() >= 6 {
    let sub = |b: u8| -> Option<f64> {
      (b'A'..=b'X').contains(&b).then(|| f64::from(b - b'A'))
    };
    // Centre of the 5'×2.5' subsquare.
    lon += sub(bytes[4])? * 2.0 / 24.0 + 1.0 / 24.0;
    lat += sub(bytes[5])? * 1.0 / 24.0 + 1.0 / 48.0;
  } else {
    // Centre of the 2°×1° square.
    lon += 1.0;
    lat += 0.5;
  }

  Some((lat, lon))
}

// ─── Static prefix table ─────────────────────────────────────────────────────

/// A coarse region estimate keyed by callsign prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrefixRegion {
  pub latitude:  f64,
  pub longitude: f64,
  pub label:     &'static str,
}

const fn region(latitude: f64, longitude: f64, label: &'static str) -> PrefixRegion {
  PrefixRegion { latitude, longitude, label }
}

/// Longest-prefix-wins region table. Deliberately coarse; this is the last
/// rung of the resolver chain.
const PREFIX_REGIONS: &[(&str, PrefixRegion)] = &[
  ("W1", region(42.3601, -71.0589, "New England")),
  ("W2", region(40.7128, -74.0060, "New York/New Jersey")),
  ("W3", region(39.9526, -75.1652, "Pennsylvania/Delaware")),
  ("W4", region(33.7490, -84.3880, "Southeast US")),
  ("W5", region(32.7767, -96.7970, "South Central US")),
  ("W6", region(34.0522, -118.2437, "California")),
  ("W7", region(47.6062, -122.3321, "Pacific Northwest")),
  ("W8", region(41.4993, -81.6944, "Great Lakes")),
  ("W9", region(41.8781, -87.6298, "Midwest")),
  ("W0", region(39.7391, -104.9847, "Mountain/Plains")),
  ("VE1", region(44.6488, -63.5752, "Nova Scotia")),
  ("VE2", region(45.5017, -73.5673, "Quebec")),
  ("VE3", region(43.6532, -79.3832, "Ontario")),
  ("VE4", region(49.8951, -97.1384, "Manitoba")),
  ("VE5", region(52.1332, -106.6700, "Saskatchewan")),
  ("VE6", region(51.0447, -114.0719, "Alberta")),
  ("VE7", region(49.2827, -123.1207, "British Columbia")),
  ("G", region(51.5074, -0.1278, "England")),
  ("GM", region(55.9533, -3.1883, "Scotland")),
  ("GW", region(51.4816, -3.1791, "Wales")),
  ("EI", region(53.3498, -6.2603, "Ireland")),
  ("ON", region(50.8503, 4.3517, "Belgium")),
  ("PA", region(52.3676, 4.9041, "Netherlands")),
  ("DL", region(52.5200, 13.4050, "Germany")),
  ("F", region(48.8566, 2.3522, "France")),
  ("JA", region(35.6762, 139.6503, "Japan")),
  ("HL", region(37.5665, 126.9780, "South Korea")),
  ("VK", region(-33.8688, 151.2093, "Australia")),
];

/// US call districts, indexed by the digit following an N/K/W/A first letter.
const US_DISTRICTS: &[(char, PrefixRegion)] = &[
  ('1', region(42.3601, -71.0589, "New England")),
  ('2', region(40.7128, -74.0060, "New York/New Jersey")),
  ('3', region(39.9526, -75.1652, "Pennsylvania/Delaware")),
  ('4', region(33.7490, -84.3880, "Southeast US")),
  ('5', region(32.7767, -96.7970, "South Central US")),
  ('6', region(34.0522, -118.2437, "California")),
  ('7', region(47.6062, -122.3321, "Pacific Northwest")),
  ('8', region(41.4993, -81.6944, "Great Lakes")),
  ('9', region(41.8781, -87.6298, "Midwest")),
  ('0', region(39.7391, -104.9847, "Mountain/Plains")),
];

/// Estimate a region from a callsign prefix: longest matching table prefix
/// first, then the `[NKWA]<digit>` US call-district rule.
pub fn prefix_region(callsign: &str) -> Option<PrefixRegion> {
  let callsign = callsign.trim().to_uppercase();

  let best = PREFIX_REGIONS
    .iter()
    .filter(|(prefix, _)| callsign.starts_with(prefix))
    .max_by_key(|(prefix, _)| prefix.len())
    .map(|(_, r)| *r);
  if best.is_some() {
    return best;
  }

  let mut chars = callsign.chars();
  let first = chars.next()?;
  let second = chars.next()?;
  if matches!(first, 'N' | 'K' | 'W' | 'A') {
    return US_DISTRICTS
      .iter()
      .find(|(d, _)| *d == second)
      .map(|(_, r)| *r);
  }

  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_point_distance_is_zero() {
    let p = (47.6062, -122.3321);
    assert!(haversine_km(p, p).abs() < 1e-9);
  }

  #[test]
  fn known_pair_distance_within_tolerance() {
    // Boston to Seattle, roughly 4000 km.
    let boston = (42.3601, -71.0589);
    let seattle = (47.6062, -122.3321);
    let d = haversine_km(boston, seattle);
    assert!((3900.0..4100.0).contains(&d), "distance {d} km");
  }

  #[test]
  fn four_char_grid_decodes_to_square_centre() {
    // FN42 covers 72°W–70°W, 42°N–43°N.
    let (lat, lon) = grid_to_coordinates("FN42").unwrap();
    assert!((lat - 42.5).abs() < 1e-9, "lat {lat}");
    assert!((lon - (-71.0)).abs() < 1e-9, "lon {lon}");
  }

  #[test]
  fn six_char_grid_decodes_to_subsquare_centre() {
    let (lat, lon) = grid_to_coordinates("FN42aa").unwrap();
    assert!((lat - (42.0 + 1.0 / 48.0)).abs() < 1e-9, "lat {lat}");
    assert!((lon - (-72.0 + 1.0 / 24.0)).abs() < 1e-9, "lon {lon}");
  }

  #[test]
  fn malformed_grids_are_rejected() {
    assert!(grid_to_coordinates("F").is_none());
    assert!(grid_to_coordinates("FN4").is_none());
    assert!(grid_to_coordinates("12AB").is_none());
    assert!(grid_to_coordinates("ZZ99").is_none());
  }

  #[test]
  fn known_prefix_beats_us_district_rule() {
    // W7 is in the table; the district rule would agree here, but the
    // longest-prefix entry must win for e.g. VE7 vs VE.
    let r = prefix_region("VE7ABC").unwrap();
    assert_eq!(r.label, "British Columbia");
  }

  #[test]
  fn us_district_rule_applies_to_n_calls() {
    let r = prefix_region("N6XYZ").unwrap();
    assert_eq!(r.label, "California");
  }

  #[test]
  fn unknown_prefix_yields_none() {
    assert!(prefix_region("ZS1ABC").is_none());
  }
}
