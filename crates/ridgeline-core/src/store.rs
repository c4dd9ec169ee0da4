//! The `SpotStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `ridgeline-store-sqlite`). The feed ingest loops, the correlation engine
//! and the resolver depend on this abstraction, not on any concrete backend.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
  location::Location,
  path::MatchedPair,
  spot::{NewActivationSpot, NewSkimmerSpot, SkimmerSpot},
};

// ─── Supporting types ────────────────────────────────────────────────────────

/// Result of an idempotent spot insert. Duplicates and stale deliveries are
/// normal outcomes, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  /// Newly stored, with its row id.
  Inserted(i64),
  /// A row with the same uniqueness key already exists; nothing was written.
  Duplicate,
  /// Rejected by the freshness filter (initial-dump backlog guard).
  Stale,
}

impl InsertOutcome {
  pub fn inserted_id(self) -> Option<i64> {
    match self {
      InsertOutcome::Inserted(id) => Some(id),
      _ => None,
    }
  }
}

/// The spatiotemporal window used when rebuilding matches.
#[derive(Debug, Clone, Copy)]
pub struct MatchWindow {
  /// Maximum |observed_at difference| for a pair to correlate.
  pub max_time_diff: Duration,
  /// Maximum |frequency difference| in Hz.
  pub max_freq_diff_hz: u64,
}

impl Default for MatchWindow {
  fn default() -> Self {
    Self {
      max_time_diff:    Duration::from_secs(30),
      max_freq_diff_hz: 10_000,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over durable, idempotent spot storage.
///
/// Every method is atomic on its own: concurrent feed loops and the
/// correlation engine coordinate exclusively through these operations, with
/// no in-process locks.
///
/// All methods return `Send` futures so the trait can be used across
/// spawned tokio tasks.
pub trait SpotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ingest ────────────────────────────────────────────────────────────

  /// Insert an activation spot, applying the freshness filter first: spots
  /// observed more than `freshness_horizon` before `now` are dropped as
  /// initial-dump backlog.
  fn insert_activation(
    &self,
    spot: NewActivationSpot,
    freshness_horizon: Duration,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Insert a skimmer spot. The store computes the target-callsign flag
  /// against `target_callsign` and seeds `retain_permanently` from it.
  fn insert_skimmer<'a>(
    &'a self,
    spot: NewSkimmerSpot,
    target_callsign: &'a str,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  // ── Correlation ───────────────────────────────────────────────────────

  /// Atomically replace the full match set: delete every existing match,
  /// re-derive pairs within `window`, and flag matched skimmer spots as
  /// activation-matched and permanently retained. Returns the number of
  /// matches produced. Readers never observe the half-rebuilt state.
  fn rebuild_matches(
    &self,
    window: MatchWindow,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete skimmer spots older than `horizon` that are not permanently
  /// retained. Returns the number of rows deleted. Activation spots are
  /// never touched.
  fn prune_skimmers(
    &self,
    horizon: Duration,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Matches correlated at or after `since`, joined with both spots, newest
  /// first.
  fn recent_matches(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<MatchedPair>, Self::Error>> + Send + '_;

  /// Recent receptions of the target callsign, newest first.
  fn target_spots(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<SkimmerSpot>, Self::Error>> + Send + '_;

  // ── Location cache ────────────────────────────────────────────────────

  /// Cached location for a normalized subject id, if any.
  fn cached_location<'a>(
    &'a self,
    subject: &'a str,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + 'a;

  /// Insert or refresh a cache entry, keyed by its normalized subject.
  fn store_location(
    &self,
    location: Location,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
