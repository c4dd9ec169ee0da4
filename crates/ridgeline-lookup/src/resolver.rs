//! The resolver chain: cache, external lookup, grid decode, prefix table.

use std::time::Duration;

use chrono::Utc;

use ridgeline_core::{
  geo::{grid_to_coordinates, prefix_region},
  location::{Location, LocationSource, normalize_subject},
  store::SpotStore,
};

use crate::{Result, client::LookupClient, error::Error};

/// Resolves subjects (summit references, skimmer spotter callsigns) to
/// coordinates.
///
/// The rungs, in order:
///
/// 1. the store's location cache, honoured only for fresh
///    [`LocationSource::CachedExternal`] entries — grid and prefix results
///    are re-derived every time so a later external answer can upgrade them;
/// 2. the external lookup service, when configured: direct coordinates, or
///    a grid locator decoded from the returned record. The service answers
///    callsigns only; summit references (which keep their `/`) skip this
///    rung, otherwise the summit's association prefix could be mistaken for
///    an unrelated station's callsign and its coordinates cached under the
///    summit key;
/// 3. the static callsign-prefix table.
///
/// Every resolved location is written back to the cache. Lookup-service
/// failures are logged and fall through to the next rung; only store errors
/// propagate.
pub struct LocationResolver<S> {
  store:         S,
  client:        Option<LookupClient>,
  cache_max_age: Duration,
}

impl<S: SpotStore> LocationResolver<S> {
  pub fn new(
    store: S,
    client: Option<LookupClient>,
    cache_max_age: Duration,
  ) -> Self {
    Self { store, client, cache_max_age }
  }

  pub async fn resolve(&self, subject: &str) -> Result<Option<Location>> {
    let subject = normalize_subject(subject);
    let now = Utc::now();

    if let Some(cached) =
      self.store.cached_location(&subject).await.map_err(store_err)?
      && cached.source == LocationSource::CachedExternal
    {
      let age = now.signed_duration_since(cached.resolved_at);
      if (0..self.cache_max_age.as_secs() as i64).contains(&age.num_seconds())
      {
        return Ok(Some(cached));
      }
    }

    // Only callsign subjects go to the lookup service. A summit reference
    // contains a `/` and would be truncated to its association prefix.
    if let Some(client) = &self.client
      && !subject.contains('/')
    {
      match client.lookup(&subject).await {
        Ok(Some(record)) => {
          if let Some((latitude, longitude)) = record.coordinates {
            let location = Location {
              subject: subject.clone(),
              latitude,
              longitude,
              label: record.label,
              source: LocationSource::CachedExternal,
              resolved_at: now,
            };
            self
              .store
              .store_location(location.clone())
              .await
              .map_err(store_err)?;
            return Ok(Some(location));
          }

          if let Some((latitude, longitude)) =
            record.grid.as_deref().and_then(grid_to_coordinates)
          {
            let location = Location {
              subject: subject.clone(),
              latitude,
              longitude,
              label: record.label,
              source: LocationSource::GeometricDecode,
              resolved_at: now,
            };
            self
              .store
              .store_location(location.clone())
              .await
              .map_err(store_err)?;
            return Ok(Some(location));
          }
        }
        Ok(None) => {}
        Err(err) => {
          tracing::debug!(%subject, %err, "external lookup failed");
        }
      }
    }

    if let Some(region) = prefix_region(&subject) {
      let location = Location {
        subject,
        latitude: region.latitude,
        longitude: region.longitude,
        label: region.label.to_string(),
        source: LocationSource::StaticTable,
        resolved_at: now,
      };
      self
        .store
        .store_location(location.clone())
        .await
        .map_err(store_err)?;
      return Ok(Some(location));
    }

    Ok(None)
  }
}

fn store_err<E>(err: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(err))
}
