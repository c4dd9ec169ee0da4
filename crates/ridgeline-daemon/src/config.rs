//! Typed configuration, deserialised from `config.toml` plus `RIDGELINE_*`
//! environment overrides.

use std::{path::PathBuf, time::Duration};

use ridgeline_core::store::MatchWindow;
use ridgeline_feed::FeedConfig;
use ridgeline_lookup::LookupConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
  pub store_path:      PathBuf,
  /// Callsign whose receptions are flagged and retained.
  pub target_callsign: String,
  /// Identification line sent to both feed servers after connect.
  pub login_callsign:  String,
  pub activation_feed: FeedSection,
  pub skimmer_feed:    FeedSection,
  #[serde(default)]
  pub lookup:          LookupSection,
  #[serde(default)]
  pub correlation:     CorrelationSection,
}

/// One feed endpoint. Timeout defaults differ per feed — the activation feed
/// is legitimately quiet for hours, the skimmer feed is not — so the fields
/// are optional here and filled in by the accessors on [`DaemonConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSection {
  pub host:                    String,
  pub port:                    u16,
  pub idle_timeout_secs:       Option<u64>,
  pub inactivity_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupSection {
  #[serde(default)]
  pub base_url:           String,
  #[serde(default)]
  pub username:           String,
  #[serde(default)]
  pub password:           String,
  #[serde(default = "default_session_ttl_secs")]
  pub session_ttl_secs:   u64,
  #[serde(default = "default_cache_max_age_days")]
  pub cache_max_age_days: u64,
}

impl Default for LookupSection {
  fn default() -> Self {
    Self {
      base_url:           String::new(),
      username:           String::new(),
      password:           String::new(),
      session_ttl_secs:   default_session_ttl_secs(),
      cache_max_age_days: default_cache_max_age_days(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationSection {
  #[serde(default = "default_cycle_secs")]
  pub cycle_secs:             u64,
  #[serde(default = "default_max_time_diff_secs")]
  pub max_time_diff_secs:     u64,
  #[serde(default = "default_max_freq_diff_hz")]
  pub max_freq_diff_hz:       u64,
  #[serde(default = "default_freshness_horizon_secs")]
  pub freshness_horizon_secs: u64,
  #[serde(default = "default_retention_horizon_secs")]
  pub retention_horizon_secs: u64,
  #[serde(default = "default_retention_cycle_secs")]
  pub retention_cycle_secs:   u64,
}

impl Default for CorrelationSection {
  fn default() -> Self {
    Self {
      cycle_secs:             default_cycle_secs(),
      max_time_diff_secs:     default_max_time_diff_secs(),
      max_freq_diff_hz:       default_max_freq_diff_hz(),
      freshness_horizon_secs: default_freshness_horizon_secs(),
      retention_horizon_secs: default_retention_horizon_secs(),
      retention_cycle_secs:   default_retention_cycle_secs(),
    }
  }
}

fn default_session_ttl_secs() -> u64 {
  3600
}
fn default_cache_max_age_days() -> u64 {
  30
}
fn default_cycle_secs() -> u64 {
  60
}
fn default_max_time_diff_secs() -> u64 {
  30
}
fn default_max_freq_diff_hz() -> u64 {
  10_000
}
fn default_freshness_horizon_secs() -> u64 {
  3600
}
fn default_retention_horizon_secs() -> u64 {
  86_400
}
fn default_retention_cycle_secs() -> u64 {
  1800
}

const RECONNECT_BACKOFF: Duration = Duration::from_secs(30);

impl DaemonConfig {
  pub fn activation_feed_config(&self) -> FeedConfig {
    feed_config(
      "activation",
      &self.activation_feed,
      &self.login_callsign,
      900,
      86_400,
    )
  }

  pub fn skimmer_feed_config(&self) -> FeedConfig {
    feed_config("skimmer", &self.skimmer_feed, &self.login_callsign, 60, 300)
  }

  pub fn match_window(&self) -> MatchWindow {
    MatchWindow {
      max_time_diff:    Duration::from_secs(self.correlation.max_time_diff_secs),
      max_freq_diff_hz: self.correlation.max_freq_diff_hz,
    }
  }

  /// `None` when credentials are absent: the resolver then skips the
  /// external rung entirely.
  pub fn lookup_config(&self) -> Option<LookupConfig> {
    if self.lookup.username.is_empty() || self.lookup.password.is_empty() {
      return None;
    }
    Some(LookupConfig {
      base_url:    self.lookup.base_url.clone(),
      username:    self.lookup.username.clone(),
      password:    self.lookup.password.clone(),
      session_ttl: Duration::from_secs(self.lookup.session_ttl_secs),
    })
  }

  pub fn cache_max_age(&self) -> Duration {
    Duration::from_secs(self.lookup.cache_max_age_days * 86_400)
  }

  pub fn freshness_horizon(&self) -> Duration {
    Duration::from_secs(self.correlation.freshness_horizon_secs)
  }

  pub fn retention_horizon(&self) -> Duration {
    Duration::from_secs(self.correlation.retention_horizon_secs)
  }

  pub fn correlation_cycle(&self) -> Duration {
    Duration::from_secs(self.correlation.cycle_secs)
  }

  pub fn retention_cycle(&self) -> Duration {
    Duration::from_secs(self.correlation.retention_cycle_secs)
  }
}

fn feed_config(
  name: &str,
  section: &FeedSection,
  login: &str,
  default_idle_secs: u64,
  default_inactivity_secs: u64,
) -> FeedConfig {
  FeedConfig {
    name:               name.to_string(),
    host:               section.host.clone(),
    port:               section.port,
    login:              login.to_string(),
    idle_timeout:       Duration::from_secs(
      section.idle_timeout_secs.unwrap_or(default_idle_secs),
    ),
    inactivity_timeout: Duration::from_secs(
      section.inactivity_timeout_secs.unwrap_or(default_inactivity_secs),
    ),
    reconnect_backoff:  RECONNECT_BACKOFF,
  }
}
