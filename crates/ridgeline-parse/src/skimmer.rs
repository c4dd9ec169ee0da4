//! Grammar for the skimmer (automated receiver) feed.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use ridgeline_core::spot::NewSkimmerSpot;

use crate::{
  error::{Rejection, Result},
  time::resolve_hhmm,
};

/// Skimmer spot line, e.g.
///
/// ```text
/// DX de W3LPL-#:   14025.0  K1ABC          CW    22 dB  23 WPM  CQ      1200Z
/// ```
///
/// The words-per-minute group and the spot type (`CQ`/`DX`/`BEACON`) are
/// matched but not retained.
static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?x)
      ^DX\ de\ (?<spotter>\S+?):
      \s+ (?<freq>[\d.]+)
      \s+ (?<call>\S+)
      \s+ (?<mode>\w+)
      \s+ (?<snr>-?\d+)\ dB
      \s+ \d+\ WPM
      \s+ \S+
      \s+ (?<time>\d{4})Z",
  )
  .expect("skimmer grammar is valid")
});

/// Parse one skimmer feed line.
pub fn parse_skimmer(
  line: &str,
  now: DateTime<Utc>,
) -> Result<NewSkimmerSpot> {
  let caps = GRAMMAR.captures(line).ok_or(Rejection::NoMatch)?;

  let freq_str = &caps["freq"];
  let frequency_khz: f64 = freq_str
    .parse()
    .map_err(|_| Rejection::BadFrequency(freq_str.to_string()))?;

  // The grammar guarantees an optional sign and digits; i32 can still
  // overflow on absurd input, which is a rejection like any other.
  let snr_str = &caps["snr"];
  let snr_db: i32 = snr_str
    .parse()
    .map_err(|_| Rejection::NoMatch)?;

  let observed_at = resolve_hhmm(&caps["time"], now)?;

  Ok(NewSkimmerSpot {
    callsign: caps["call"].to_string(),
    frequency_khz,
    snr_db,
    mode: caps["mode"].to_string(),
    spotter: caps["spotter"].to_string(),
    observed_at,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap()
  }

  #[test]
  fn parses_a_typical_spot_line() {
    let line =
      "DX de W3LPL-#:   14025.0  K1ABC          CW    22 dB  23 WPM  CQ      1200Z";
    let spot = parse_skimmer(line, now()).unwrap();
    assert_eq!(spot.spotter, "W3LPL-#");
    assert!((spot.frequency_khz - 14025.0).abs() < 1e-9);
    assert_eq!(spot.callsign, "K1ABC");
    assert_eq!(spot.mode, "CW");
    assert_eq!(spot.snr_db, 22);
    assert_eq!(
      spot.observed_at,
      Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    );
  }

  #[test]
  fn negative_snr_is_accepted() {
    let line =
      "DX de DK9IP-#: 7028.1 W1AW/QRP CW -3 dB 18 WPM CQ 0930Z";
    let spot = parse_skimmer(line, now()).unwrap();
    assert_eq!(spot.snr_db, -3);
    assert_eq!(spot.callsign, "W1AW/QRP");
  }

  #[test]
  fn lines_without_wpm_group_do_not_match() {
    // Activation-feed shaped lines must not parse as skimmer spots.
    let line = "DX de G0ABC: 14062.0 W1AW/P W4G/NG-001 CW 1432Z";
    assert_eq!(parse_skimmer(line, now()), Err(Rejection::NoMatch));
  }

  #[test]
  fn banner_lines_do_not_match() {
    let line = "Welcome to the server. Please enter your call.";
    assert_eq!(parse_skimmer(line, now()), Err(Rejection::NoMatch));
  }

  #[test]
  fn malformed_frequency_is_rejected() {
    let line =
      "DX de W3LPL-#: 14.025.0 K1ABC CW 22 dB 23 WPM CQ 1200Z";
    assert_eq!(
      parse_skimmer(line, now()),
      Err(Rejection::BadFrequency("14.025.0".to_string()))
    );
  }
}
