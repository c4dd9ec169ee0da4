//! [`SqliteStore`] — the SQLite implementation of [`SpotStore`].

use std::{path::Path, time::Duration};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use ridgeline_core::{
  location::Location,
  path::MatchedPair,
  spot::{NewActivationSpot, NewSkimmerSpot, SkimmerSpot, is_target_callsign},
  store::{InsertOutcome, MatchWindow, SpotStore},
};

use crate::{
  Error, Result,
  encode::{RawActivation, RawLocation, RawMatchedPair, RawSkimmer, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Ridgeline spot store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn skimmer_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<RawSkimmer> {
  Ok(RawSkimmer {
    id:                 row.get(offset)?,
    callsign:           row.get(offset + 1)?,
    frequency_khz:      row.get(offset + 2)?,
    snr_db:             row.get(offset + 3)?,
    mode:               row.get(offset + 4)?,
    spotter:            row.get(offset + 5)?,
    observed_at:        row.get(offset + 6)?,
    is_target:          row.get(offset + 7)?,
    activation_matched: row.get(offset + 8)?,
    retain_permanently: row.get(offset + 9)?,
  })
}

// ─── SpotStore impl ──────────────────────────────────────────────────────────

impl SpotStore for SqliteStore {
  type Error = Error;

  // ── Ingest ────────────────────────────────────────────────────────────────

  async fn insert_activation(
    &self,
    spot: NewActivationSpot,
    freshness_horizon: Duration,
    now: DateTime<Utc>,
  ) -> Result<InsertOutcome> {
    // Initial-dump guard: feeds replay a backlog right after the login
    // handshake, and that backlog must not pass for live traffic.
    let age = now.signed_duration_since(spot.observed_at);
    if age.num_seconds() > freshness_horizon.as_secs() as i64 {
      return Ok(InsertOutcome::Stale);
    }

    let observed_at = encode_dt(spot.observed_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO activation_spots
             (callsign, frequency_khz, summit, spotter, observed_at, comment)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            spot.callsign,
            spot.frequency_khz,
            spot.summit,
            spot.spotter,
            observed_at,
            spot.comment,
          ],
        )?;
        Ok(if changed == 0 {
          InsertOutcome::Duplicate
        } else {
          InsertOutcome::Inserted(conn.last_insert_rowid())
        })
      })
      .await?;

    Ok(outcome)
  }

  async fn insert_skimmer(
    &self,
    spot: NewSkimmerSpot,
    target_callsign: &str,
  ) -> Result<InsertOutcome> {
    let is_target = is_target_callsign(&spot.callsign, target_callsign);
    let observed_at = encode_dt(spot.observed_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO skimmer_spots
             (callsign, frequency_khz, snr_db, mode, spotter, observed_at,
              is_target, activation_matched, retain_permanently)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?7)",
          rusqlite::params![
            spot.callsign,
            spot.frequency_khz,
            spot.snr_db,
            spot.mode,
            spot.spotter,
            observed_at,
            is_target,
          ],
        )?;
        Ok(if changed == 0 {
          InsertOutcome::Duplicate
        } else {
          InsertOutcome::Inserted(conn.last_insert_rowid())
        })
      })
      .await?;

    Ok(outcome)
  }

  // ── Correlation ───────────────────────────────────────────────────────────

  async fn rebuild_matches(
    &self,
    window: MatchWindow,
    now: DateTime<Utc>,
  ) -> Result<usize> {
    let correlated_at = encode_dt(now);
    let max_secs = window.max_time_diff.as_secs() as i64;
    let max_khz = window.max_freq_diff_hz as f64 / 1000.0;

    let count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM matches", [])?;

        let inserted = tx.execute(
          "INSERT INTO matches
             (activation_id, skimmer_id, time_diff_secs, freq_diff_hz,
              correlated_at)
           SELECT
             a.id,
             s.id,
             CAST(strftime('%s', s.observed_at) AS INTEGER)
               - CAST(strftime('%s', a.observed_at) AS INTEGER),
             CAST(ROUND((s.frequency_khz - a.frequency_khz) * 1000.0)
               AS INTEGER),
             ?1
           FROM activation_spots a
           JOIN skimmer_spots s ON s.callsign = a.callsign
           WHERE ABS(CAST(strftime('%s', s.observed_at) AS INTEGER)
                   - CAST(strftime('%s', a.observed_at) AS INTEGER)) <= ?2
             AND ABS(s.frequency_khz - a.frequency_khz) <= ?3",
          rusqlite::params![correlated_at, max_secs, max_khz],
        )?;

        // Monotonic: matched rows are flagged, unmatched rows are left
        // alone — a flag set by an earlier cycle is never cleared.
        tx.execute(
          "UPDATE skimmer_spots
           SET activation_matched = 1, retain_permanently = 1
           WHERE id IN (SELECT skimmer_id FROM matches)",
          [],
        )?;

        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    Ok(count)
  }

  async fn prune_skimmers(
    &self,
    horizon: Duration,
    now: DateTime<Utc>,
  ) -> Result<usize> {
    let cutoff =
      encode_dt(now - chrono::Duration::seconds(horizon.as_secs() as i64));

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM skimmer_spots
           WHERE observed_at < ?1 AND retain_permanently = 0",
          rusqlite::params![cutoff],
        )?)
      })
      .await?;

    Ok(deleted)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn recent_matches(
    &self,
    since: DateTime<Utc>,
  ) -> Result<Vec<MatchedPair>> {
    let since = encode_dt(since);

    let raws: Vec<RawMatchedPair> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             m.id, m.time_diff_secs, m.freq_diff_hz, m.correlated_at,
             a.id, a.callsign, a.frequency_khz, a.summit, a.spotter,
             a.observed_at, a.comment,
             s.id, s.callsign, s.frequency_khz, s.snr_db, s.mode, s.spotter,
             s.observed_at, s.is_target, s.activation_matched,
             s.retain_permanently
           FROM matches m
           JOIN activation_spots a ON a.id = m.activation_id
           JOIN skimmer_spots   s ON s.id = m.skimmer_id
           WHERE m.correlated_at >= ?1
           ORDER BY m.correlated_at DESC, m.id DESC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![since], |row| {
            Ok(RawMatchedPair {
              match_id:       row.get(0)?,
              time_diff_secs: row.get(1)?,
              freq_diff_hz:   row.get(2)?,
              correlated_at:  row.get(3)?,
              activation:     RawActivation {
                id:            row.get(4)?,
                callsign:      row.get(5)?,
                frequency_khz: row.get(6)?,
                summit:        row.get(7)?,
                spotter:       row.get(8)?,
                observed_at:   row.get(9)?,
                comment:       row.get(10)?,
              },
              skimmer:        skimmer_from_row(row, 11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatchedPair::into_pair).collect()
  }

  async fn target_spots(
    &self,
    since: DateTime<Utc>,
  ) -> Result<Vec<SkimmerSpot>> {
    let since = encode_dt(since);

    let raws: Vec<RawSkimmer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, callsign, frequency_khz, snr_db, mode, spotter,
                  observed_at, is_target, activation_matched,
                  retain_permanently
           FROM skimmer_spots
           WHERE is_target = 1 AND observed_at >= ?1
           ORDER BY observed_at DESC, id DESC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![since], |row| skimmer_from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSkimmer::into_spot).collect()
  }

  // ── Location cache ────────────────────────────────────────────────────────

  async fn cached_location(&self, subject: &str) -> Result<Option<Location>> {
    let subject = subject.to_string();

    let raw: Option<RawLocation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject, latitude, longitude, label, source,
                      resolved_at
               FROM locations WHERE subject = ?1",
              rusqlite::params![subject],
              |row| {
                Ok(RawLocation {
                  subject:     row.get(0)?,
                  latitude:    row.get(1)?,
                  longitude:   row.get(2)?,
                  label:       row.get(3)?,
                  source:      row.get(4)?,
                  resolved_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLocation::into_location).transpose()
  }

  async fn store_location(&self, location: Location) -> Result<()> {
    let source = location.source.as_str();
    let resolved_at = encode_dt(location.resolved_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO locations
             (subject, latitude, longitude, label, source, resolved_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            location.subject,
            location.latitude,
            location.longitude,
            location.label,
            source,
            resolved_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
