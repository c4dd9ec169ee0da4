//! Propagation-path read model: recent matches joined with resolved
//! locations.

use chrono::{DateTime, Utc};
use ridgeline_core::{geo::haversine_km, path::PropagationPath, store::SpotStore};
use ridgeline_lookup::{Error, LocationResolver};

/// Build the path rows for every match correlated at or after `since`.
///
/// A pair with an unresolvable endpoint is skipped, not an error; the map
/// layer simply never sees it.
pub async fn collect_paths<S>(
  store: &S,
  resolver: &LocationResolver<S>,
  since: DateTime<Utc>,
) -> ridgeline_lookup::Result<Vec<PropagationPath>>
where
  S: SpotStore,
{
  let pairs = store
    .recent_matches(since)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let mut paths = Vec::with_capacity(pairs.len());
  for pair in pairs {
    let Some(summit_location) =
      resolver.resolve(&pair.activation.summit).await?
    else {
      tracing::debug!(
        summit = %pair.activation.summit,
        "unresolved summit, skipping path"
      );
      continue;
    };

    let Some(spotter_location) =
      resolver.resolve(&pair.skimmer.spotter).await?
    else {
      tracing::debug!(
        spotter = %pair.skimmer.spotter,
        "unresolved spotter, skipping path"
      );
      continue;
    };

    let distance_km = haversine_km(
      (summit_location.latitude, summit_location.longitude),
      (spotter_location.latitude, spotter_location.longitude),
    );

    paths.push(PropagationPath {
      callsign: pair.skimmer.callsign,
      summit: pair.activation.summit,
      summit_location,
      spotter: pair.skimmer.spotter,
      spotter_location,
      frequency_khz: pair.skimmer.frequency_khz,
      snr_db: pair.skimmer.snr_db,
      distance_km,
      observed_at: pair.skimmer.observed_at,
    });
  }

  Ok(paths)
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use ridgeline_core::{
    spot::{NewActivationSpot, NewSkimmerSpot},
    store::MatchWindow,
  };
  use ridgeline_store_sqlite::SqliteStore;

  use super::*;

  async fn seeded_store(spotter: &str) -> SqliteStore {
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
          spotter:       spotter.to_string(),
          observed_at:   now + chrono::Duration::seconds(10),
        },
        "N0CALL",
      )
      .await
      .unwrap();
    store
      .rebuild_matches(MatchWindow::default(), now)
      .await
      .unwrap();

    store
  }

  fn resolver(store: &SqliteStore) -> LocationResolver<SqliteStore> {
    LocationResolver::new(store.clone(), None, Duration::from_secs(30 * 86_400))
  }

  #[tokio::test]
  async fn resolved_pair_produces_a_path() {
    let store = seeded_store("W3LPL-#").await;
    let since = Utc::now() - chrono::Duration::minutes(1);

    let paths = collect_paths(&store, &resolver(&store), since).await.unwrap();
    assert_eq!(paths.len(), 1);

    let path = &paths[0];
    assert_eq!(path.callsign, "W1AW/P");
    assert_eq!(path.summit, "W4G/NG-001");
    assert_eq!(path.spotter, "W3LPL-#");
    // Atlanta-ish to Philadelphia-ish, both from the prefix table.
    assert!(path.distance_km > 500.0 && path.distance_km < 2000.0);
  }

  #[tokio::test]
  async fn unresolvable_spotter_is_skipped() {
    let store = seeded_store("ZS1ABC-#").await;
    let since = Utc::now() - chrono::Duration::minutes(1);

    let paths = collect_paths(&store, &resolver(&store), since).await.unwrap();
    assert!(paths.is_empty());
  }
}
