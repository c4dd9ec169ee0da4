//! The periodic correlation and retention driver.

use std::time::Duration;

use chrono::Utc;
use ridgeline_core::{
  path::PathStats,
  store::{MatchWindow, SpotStore},
};
use ridgeline_lookup::LocationResolver;
use tokio::sync::watch;

use crate::report::collect_paths;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
  pub correlation_cycle: Duration,
  pub retention_cycle:   Duration,
  pub window:            MatchWindow,
  pub retention_horizon: Duration,
}

/// Run the engine until shutdown.
///
/// Correlation and retention tick on independent intervals; neither waits
/// for the other. A failed tick is logged and the loop carries on — the next
/// tick starts from a clean slate because the rebuild is wholesale.
pub async fn run_engine<S>(
  store: S,
  resolver: LocationResolver<S>,
  config: EngineConfig,
  mut shutdown: watch::Receiver<bool>,
) where
  S: SpotStore + Clone,
{
  let mut correlation = tokio::time::interval(config.correlation_cycle);
  let mut retention = tokio::time::interval(config.retention_cycle);
  correlation.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
  retention.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

  loop {
    tokio::select! {
      _ = shutdown.changed() => break,
      _ = correlation.tick() => {
        correlate(&store, &resolver, &config).await;
      }
      _ = retention.tick() => {
        let now = Utc::now();
        match store.prune_skimmers(config.retention_horizon, now).await {
          Ok(0) => tracing::debug!("retention cycle, nothing to prune"),
          Ok(deleted) => tracing::info!(deleted, "retention cycle pruned spots"),
          Err(e) => tracing::error!(error = %e, "retention cycle failed"),
        }
      }
    }
  }

  tracing::info!("engine stopped");
}

async fn correlate<S>(
  store: &S,
  resolver: &LocationResolver<S>,
  config: &EngineConfig,
) where
  S: SpotStore + Clone,
{
  let now = Utc::now();

  let count = match store.rebuild_matches(config.window, now).await {
    Ok(count) => count,
    Err(e) => {
      tracing::error!(error = %e, "correlation cycle failed");
      return;
    }
  };

  if count == 0 {
    tracing::debug!("correlation cycle, no matches");
    return;
  }

  // Every current match carries this cycle's correlated_at, so a window of
  // one cycle covers the full set.
  let since = now - chrono::Duration::seconds(
    config.correlation_cycle.as_secs() as i64,
  );
  match collect_paths(store, resolver, since).await {
    Ok(paths) => {
      let stats = PathStats::from_paths(&paths);
      tracing::info!(
        matches = count,
        paths = stats.total_paths,
        summits = stats.unique_summits,
        spotters = stats.unique_spotters,
        max_distance_km = stats.max_distance_km,
        "correlation cycle complete"
      );
    }
    Err(e) => {
      tracing::warn!(error = %e, matches = count, "path collection failed");
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use ridgeline_core::spot::{NewActivationSpot, NewSkimmerSpot};
  use ridgeline_store_sqlite::SqliteStore;

  use super::*;

  #[tokio::test]
  async fn engine_correlates_and_stops_on_shutdown() {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    let now = Utc::now();

    store
      .insert_activation(
        NewActivationSpot {
          callsign:      "W1AW/P".to_string(),
          frequency_khz: 14062.0,
          summit:        "W4G/NG-001".to_string(),
          spotter:       "G0ABC".to_string(),
          observed_at:   now,
          comment:       String::new(),
        },
        Duration::from_secs(3600),
        now,
      )
      .await
      .unwrap();
    store
      .insert_skimmer(
        NewSkimmerSpot {
          callsign:      "W1AW/P".to_string(),
          frequency_khz: 14063.0,
          snr_db:        18,
          mode:          "CW".to_string(),
          spotter:       "W3LPL-#".to_string(),
          observed_at:   now + chrono::Duration::seconds(10),
        },
        "N0CALL",
      )
      .await
      .unwrap();

    let resolver = LocationResolver::new(
      store.clone(),
      None,
      Duration::from_secs(30 * 86_400),
    );
    let config = EngineConfig {
      correlation_cycle: Duration::from_millis(50),
      retention_cycle:   Duration::from_millis(50),
      window:            MatchWindow::default(),
      retention_horizon: Duration::from_secs(86_400),
    };

    let (tx, rx) = watch::channel(false);
    let engine = tokio::spawn(run_engine(store.clone(), resolver, config, rx));

    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(true).unwrap();
    engine.await.unwrap();

    let pairs = store
      .recent_matches(now - chrono::Duration::minutes(1))
      .await
      .unwrap();
    assert_eq!(pairs.len(), 1);
  }
}
