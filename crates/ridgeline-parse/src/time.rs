//! Hour/minute → UTC instant resolution.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Rejection, Result};

/// Resolve a compact `hhmm` time-of-day field to a full UTC instant.
///
/// The feed transmits only hour and minute, so the date is assumed to be
/// today (in UTC). If that lands in the future relative to `now`, the spot
/// crossed midnight in transit and is rolled back one calendar day.
pub fn resolve_hhmm(hhmm: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
  let bad = || Rejection::BadTime(hhmm.to_string());

  if hhmm.len() != 4 || !hhmm.bytes().all(|b| b.is_ascii_digit()) {
    return Err(bad());
  }

  let hour: u32 = hhmm[..2].parse().map_err(|_| bad())?;
  let minute: u32 = hhmm[2..].parse().map_err(|_| bad())?;

  let candidate = now
    .date_naive()
    .and_hms_opt(hour, minute, 0)
    .ok_or_else(bad)?
    .and_utc();

  if candidate > now {
    Ok(candidate - Duration::days(1))
  } else {
    Ok(candidate)
  }
}
