//! Grammar for the summit-activation feed.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use ridgeline_core::spot::NewActivationSpot;

use crate::{
  error::{Rejection, Result},
  time::resolve_hhmm,
};

/// Activation spot line, e.g.
///
/// ```text
/// DX de G0ABC:     14062.0  W1AW/P       W4G/NG-001 CW QRP       1432Z
/// ```
static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?x)
      ^DX\ de\ (?<spotter>\S+?):
      \s+ (?<freq>[\d.]+)
      \s+ (?<call>\S+)
      \s+ (?<summit>[A-Za-z0-9/-]+)
      (?: \s+ (?<comment>\S.*?) )?
      \s+ (?<time>\d{4})Z",
  )
  .expect("activation grammar is valid")
});

/// Parse one activation feed line.
///
/// `now` anchors hour/minute resolution — see
/// [`resolve_hhmm`](crate::time::resolve_hhmm).
pub fn parse_activation(
  line: &str,
  now: DateTime<Utc>,
) -> Result<NewActivationSpot> {
  let caps = GRAMMAR.captures(line).ok_or(Rejection::NoMatch)?;

  let freq_str = &caps["freq"];
  let frequency_khz: f64 = freq_str
    .parse()
    .map_err(|_| Rejection::BadFrequency(freq_str.to_string()))?;

  let observed_at = resolve_hhmm(&caps["time"], now)?;

  Ok(NewActivationSpot {
    callsign: caps["call"].to_string(),
    frequency_khz,
    summit: caps["summit"].to_string(),
    spotter: caps["spotter"].to_string(),
    observed_at,
    comment: caps
      .name("comment")
      .map(|m| m.as_str().trim_end().to_string())
      .unwrap_or_default(),
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
      "DX de G0ABC:     14062.0  W1AW/P       W4G/NG-001 CW QRP       1432Z";
    let spot = parse_activation(line, now()).unwrap();
    assert_eq!(spot.spotter, "G0ABC");
    assert!((spot.frequency_khz - 14062.0).abs() < 1e-9);
    assert_eq!(spot.callsign, "W1AW/P");
    assert_eq!(spot.summit, "W4G/NG-001");
    assert_eq!(spot.comment, "CW QRP");
    assert_eq!(
      spot.observed_at,
      Utc.with_ymd_and_hms(2024, 3, 10, 14, 32, 0).unwrap()
    );
  }

  #[test]
  fn parses_a_spot_without_comment() {
    let line = "DX de ON6ZQ:  7032.5 DL1ABC/P DM/BW-001  1005Z";
    let spot = parse_activation(line, now()).unwrap();
    assert_eq!(spot.summit, "DM/BW-001");
    assert_eq!(spot.comment, "");
  }

  #[test]
  fn prompt_lines_do_not_match() {
    assert_eq!(
      parse_activation("Please enter your call:", now()),
      Err(Rejection::NoMatch)
    );
    assert_eq!(parse_activation("", now()), Err(Rejection::NoMatch));
  }

  #[test]
  fn malformed_frequency_is_rejected() {
    let line = "DX de G0ABC: 14.06.20 W1AW/P W4G/NG-001 CW 1432Z";
    assert_eq!(
      parse_activation(line, now()),
      Err(Rejection::BadFrequency("14.06.20".to_string()))
    );
  }

  #[test]
  fn truncated_line_is_rejected() {
    let line = "DX de G0ABC: 14062.0 W1AW/P";
    assert_eq!(parse_activation(line, now()), Err(Rejection::NoMatch));
  }

  #[test]
  fn non_four_digit_time_is_rejected() {
    let line = "DX de G0ABC: 14062.0 W1AW/P W4G/NG-001 CW 143Z";
    assert_eq!(parse_activation(line, now()), Err(Rejection::NoMatch));
  }
}
