//! [`LineSink`] implementations: parse each feed line and insert the spot.
//!
//! Parse rejections drop the line and carry on; non-spot lines (prompts,
//! banners) are expected traffic and only show up at trace level. Store
//! errors are logged and swallowed so a database hiccup never takes down a
//! reader loop.

use std::time::Duration;

use chrono::Utc;
use ridgeline_core::{
  spot::is_target_callsign,
  store::{InsertOutcome, SpotStore},
};
use ridgeline_feed::LineSink;
use ridgeline_parse::{Rejection, parse_activation, parse_skimmer};

// ─── Activation feed ─────────────────────────────────────────────────────────

pub struct ActivationIngest<S> {
  store:             S,
  freshness_horizon: Duration,
}

impl<S: SpotStore> ActivationIngest<S> {
  pub fn new(store: S, freshness_horizon: Duration) -> Self {
    Self { store, freshness_horizon }
  }
}

impl<S: SpotStore> LineSink for ActivationIngest<S> {
  async fn deliver(&self, line: &str) {
    let now = Utc::now();
    let spot = match parse_activation(line, now) {
      Ok(spot) => spot,
      Err(Rejection::NoMatch) => {
        tracing::trace!(%line, "non-spot activation line");
        return;
      }
      Err(rejection) => {
        tracing::debug!(%line, %rejection, "rejected activation line");
        return;
      }
    };

    let callsign = spot.callsign.clone();
    let summit = spot.summit.clone();

    match self
      .store
      .insert_activation(spot, self.freshness_horizon, now)
      .await
    {
      Ok(InsertOutcome::Inserted(id)) => {
        tracing::info!(id, %callsign, %summit, "activation spot stored");
      }
      Ok(InsertOutcome::Duplicate) => {
        tracing::debug!(%callsign, %summit, "duplicate activation spot");
      }
      Ok(InsertOutcome::Stale) => {
        tracing::debug!(%callsign, %summit, "stale activation spot dropped");
      }
      Err(e) => {
        tracing::error!(error = %e, "activation insert failed");
      }
    }
  }
}

// ─── Skimmer feed ────────────────────────────────────────────────────────────

pub struct SkimmerIngest<S> {
  store:           S,
  target_callsign: String,
}

impl<S: SpotStore> SkimmerIngest<S> {
  pub fn new(store: S, target_callsign: String) -> Self {
    Self { store, target_callsign }
  }
}

impl<S: SpotStore> LineSink for SkimmerIngest<S> {
  async fn deliver(&self, line: &str) {
    let now = Utc::now();
    let spot = match parse_skimmer(line, now) {
      Ok(spot) => spot,
      Err(Rejection::NoMatch) => {
        tracing::trace!(%line, "non-spot skimmer line");
        return;
      }
      Err(rejection) => {
        tracing::debug!(%line, %rejection, "rejected skimmer line");
        return;
      }
    };

    let heard_target = is_target_callsign(&spot.callsign, &self.target_callsign);
    let callsign = spot.callsign.clone();
    let spotter = spot.spotter.clone();
    let snr_db = spot.snr_db;

    match self.store.insert_skimmer(spot, &self.target_callsign).await {
      Ok(InsertOutcome::Inserted(id)) if heard_target => {
        tracing::info!(id, %callsign, %spotter, snr_db, "target callsign heard");
      }
      Ok(InsertOutcome::Inserted(_)) => {
        tracing::trace!(%callsign, %spotter, "skimmer spot stored");
      }
      Ok(InsertOutcome::Duplicate) => {
        tracing::trace!(%callsign, %spotter, "duplicate skimmer spot");
      }
      Ok(InsertOutcome::Stale) => {}
      Err(e) => {
        tracing::error!(error = %e, "skimmer insert failed");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use ridgeline_store_sqlite::SqliteStore;

  use super::*;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store")
  }

  fn hhmm_now() -> String {
    Utc::now().format("%H%M").to_string()
  }

  #[tokio::test]
  async fn activation_line_lands_in_the_store() {
    let s = store().await;
    let sink = ActivationIngest::new(s.clone(), Duration::from_secs(3600));

    // Anchor both spots to the same wall-clock minute so the pair sits
    // inside the default correlation window.
    use chrono::Timelike as _;
    let now = Utc::now();
    let minute = now.with_second(0).unwrap().with_nanosecond(0).unwrap();

    let line = format!(
      "DX de G0ABC:     14062.0  W1AW/P       W4G/NG-001 CW QRP       {}Z",
      now.format("%H%M")
    );
    sink.deliver(&line).await;
    // Redelivery is a silent no-op.
    sink.deliver(&line).await;

    s.insert_skimmer(
      ridgeline_core::spot::NewSkimmerSpot {
        callsign:      "W1AW/P".to_string(),
        frequency_khz: 14062.0,
        snr_db:        20,
        mode:          "CW".to_string(),
        spotter:       "W3LPL-#".to_string(),
        observed_at:   minute,
      },
      "N0CALL",
    )
    .await
    .unwrap();

    let count = s
      .rebuild_matches(Default::default(), Utc::now())
      .await
      .unwrap();
    assert_eq!(count, 1);
  }

  #[tokio::test]
  async fn target_skimmer_line_is_flagged() {
    let s = store().await;
    let sink = SkimmerIngest::new(s.clone(), "W1AW".to_string());

    let line = format!(
      "DX de W3LPL-#:   14025.0  W1AW/P         CW    22 dB  23 WPM  CQ      {}Z",
      hhmm_now()
    );
    sink.deliver(&line).await;

    let spots = s
      .target_spots(Utc::now() - chrono::Duration::hours(25))
      .await
      .unwrap();
    assert_eq!(spots.len(), 1);
    assert!(spots[0].retain_permanently);
  }

  #[tokio::test]
  async fn garbage_lines_are_ignored() {
    let s = store().await;
    let activation = ActivationIngest::new(s.clone(), Duration::from_secs(3600));
    let skimmer = SkimmerIngest::new(s.clone(), "W1AW".to_string());

    for line in [
      "Please enter your call:",
      "DX de G0ABC: not-a-number W1AW/P W4G/NG-001 CW 1432Z",
      "",
    ] {
      activation.deliver(line).await;
      skimmer.deliver(line).await;
    }

    let spots = s
      .target_spots(Utc::now() - chrono::Duration::hours(25))
      .await
      .unwrap();
    assert!(spots.is_empty());
  }
}
