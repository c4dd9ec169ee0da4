//! SQL schema for the Ridgeline SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// All timestamps are RFC 3339 UTC text with a trailing `Z` and whole-second
/// precision, so lexicographic string comparison is chronological.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Activation spots are never deleted and never updated.
CREATE TABLE IF NOT EXISTS activation_spots (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    callsign      TEXT NOT NULL,
    frequency_khz REAL NOT NULL,
    summit        TEXT NOT NULL,
    spotter       TEXT NOT NULL,
    observed_at   TEXT NOT NULL,
    comment       TEXT NOT NULL DEFAULT '',
    UNIQUE (callsign, frequency_khz, summit, observed_at, spotter)
);

-- Skimmer spots are updated only to set the three flags; retain_permanently
-- is monotonic and never cleared once set.
CREATE TABLE IF NOT EXISTS skimmer_spots (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    callsign           TEXT NOT NULL,
    frequency_khz      REAL NOT NULL,
    snr_db             INTEGER NOT NULL,
    mode               TEXT NOT NULL,
    spotter            TEXT NOT NULL,
    observed_at        TEXT NOT NULL,
    is_target          INTEGER NOT NULL DEFAULT 0,
    activation_matched INTEGER NOT NULL DEFAULT 0,
    retain_permanently INTEGER NOT NULL DEFAULT 0,
    UNIQUE (callsign, frequency_khz, observed_at, spotter)
);

-- Fully derived; wiped and rebuilt inside one transaction every correlation
-- cycle.
CREATE TABLE IF NOT EXISTS matches (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    activation_id  INTEGER NOT NULL REFERENCES activation_spots(id),
    skimmer_id     INTEGER NOT NULL REFERENCES skimmer_spots(id),
    time_diff_secs INTEGER NOT NULL,
    freq_diff_hz   INTEGER NOT NULL,
    correlated_at  TEXT NOT NULL
);

-- Resolver cache, keyed by normalized subject id (summit ref, or spotter
-- call with its instance suffix stripped).
CREATE TABLE IF NOT EXISTS locations (
    subject     TEXT PRIMARY KEY,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    label       TEXT NOT NULL DEFAULT '',
    source      TEXT NOT NULL,
    resolved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS activation_callsign_idx ON activation_spots(callsign);
CREATE INDEX IF NOT EXISTS skimmer_callsign_idx    ON skimmer_spots(callsign);
CREATE INDEX IF NOT EXISTS skimmer_observed_idx    ON skimmer_spots(observed_at);
CREATE INDEX IF NOT EXISTS matches_correlated_idx  ON matches(correlated_at);

PRAGMA user_version = 1;
";
