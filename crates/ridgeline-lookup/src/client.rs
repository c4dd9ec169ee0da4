//! HTTP client for the external callsign lookup service.
//!
//! The service speaks a session-keyed XML-over-GET protocol: a login request
//! with credentials yields a session key, and subsequent lookups pass that
//! key as a query parameter. Keys expire server-side, so the client
//! re-authenticates transparently when a response reports a dead session.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
  Result,
  error::Error,
  session::Session,
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LookupConfig {
  /// Base URL of the XML endpoint.
  pub base_url:    String,
  pub username:    String,
  pub password:    String,
  /// How long an issued session key is trusted before re-authenticating.
  pub session_ttl: Duration,
}

/// What a successful lookup yields for one callsign.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRecord {
  pub callsign:    String,
  /// Human-readable label assembled from the operator's name and address.
  pub label:       String,
  /// Direct coordinates, when the service has them on file.
  pub coordinates: Option<(f64, f64)>,
  /// Grid locator, when present. Used as a decode fallback by the resolver.
  pub grid:        Option<String>,
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LookupResponse {
  #[serde(rename = "Session")]
  session:  Option<SessionElement>,
  #[serde(rename = "Callsign")]
  callsign: Option<CallsignElement>,
}

#[derive(Debug, Deserialize)]
struct SessionElement {
  #[serde(rename = "Key")]
  key:   Option<String>,
  #[serde(rename = "Error")]
  error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallsignElement {
  call:    Option<String>,
  fname:   Option<String>,
  name:    Option<String>,
  addr2:   Option<String>,
  state:   Option<String>,
  country: Option<String>,
  grid:    Option<String>,
  lat:     Option<String>,
  lon:     Option<String>,
}

fn parse_response(xml: &str) -> Result<LookupResponse> {
  Ok(quick_xml::de::from_str(xml)?)
}

fn session_is_dead(response: &LookupResponse) -> bool {
  response
    .session
    .as_ref()
    .and_then(|s| s.error.as_deref())
    .is_some_and(|e| e.to_lowercase().contains("session"))
}

/// The portion of a callsign before any `/P`, `/QRP`, ... suffix, uppercased.
fn base_call(callsign: &str) -> String {
  let callsign = callsign.trim().to_uppercase();
  match callsign.split_once('/') {
    Some((base, _)) => base.to_string(),
    None => callsign,
  }
}

fn record_from(call: &str, response: LookupResponse) -> Option<LookupRecord> {
  let cs = response.callsign?;

  let coordinates = match (cs.lat.as_deref(), cs.lon.as_deref()) {
    (Some(lat), Some(lon)) => {
      match (lat.parse::<f64>(), lon.parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Some((lat, lon)),
        _ => None,
      }
    }
    _ => None,
  };

  let name = [cs.fname.as_deref(), cs.name.as_deref()]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");
  let label = [
    Some(name.as_str()).filter(|s| !s.is_empty()),
    cs.addr2.as_deref(),
    cs.state.as_deref(),
    cs.country.as_deref(),
  ]
  .into_iter()
  .flatten()
  .collect::<Vec<_>>()
  .join(", ");

  Some(LookupRecord {
    callsign: cs.call.unwrap_or_else(|| call.to_string()),
    label,
    coordinates,
    grid: cs.grid.filter(|g| !g.is_empty()),
  })
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct LookupClient {
  http:    reqwest::Client,
  config:  LookupConfig,
  session: Mutex<Option<Session>>,
}

impl LookupClient {
  /// Build a client. Fails with [`Error::NoCredentials`] when the username
  /// or password is empty, so callers can skip the external rung entirely.
  pub fn new(config: LookupConfig) -> Result<Self> {
    if config.username.is_empty() || config.password.is_empty() {
      return Err(Error::NoCredentials);
    }

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;

    Ok(Self { http, config, session: Mutex::new(None) })
  }

  /// Look up a callsign. `Ok(None)` means the service has no record for it.
  pub async fn lookup(&self, callsign: &str) -> Result<Option<LookupRecord>> {
    let call = base_call(callsign);

    let mut session = self.session.lock().await;
    let now = Utc::now();

    let key = match session
      .as_ref()
      .filter(|s| s.is_valid(self.config.session_ttl, now))
    {
      Some(live) => live.key.clone(),
      None => {
        let fresh = self.login().await?;
        let key = fresh.key.clone();
        *session = Some(fresh);
        key
      }
    };

    let mut response = self.fetch(&key, &call).await?;

    // The server may kill a key before its nominal TTL; one re-login covers
    // that without looping.
    if session_is_dead(&response) {
      tracing::debug!(%call, "session rejected, re-authenticating");
      let fresh = self.login().await?;
      let key = fresh.key.clone();
      *session = Some(fresh);
      response = self.fetch(&key, &call).await?;
    }

    Ok(record_from(&call, response))
  }

  async fn login(&self) -> Result<Session> {
    let body = self
      .http
      .get(&self.config.base_url)
      .query(&[
        ("username", self.config.username.as_str()),
        ("password", self.config.password.as_str()),
        ("agent", "ridgeline"),
      ])
      .send()
      .await?
      .text()
      .await?;

    let response = parse_response(&body)?;
    let session = response.session.ok_or_else(|| {
      Error::SessionRejected("no session element in login response".to_string())
    })?;

    match session.key {
      Some(key) => {
        tracing::debug!("lookup session established");
        Ok(Session::new(key, Utc::now()))
      }
      None => Err(Error::SessionRejected(
        session.error.unwrap_or_else(|| "no key issued".to_string()),
      )),
    }
  }

  async fn fetch(&self, key: &str, call: &str) -> Result<LookupResponse> {
    let body = self
      .http
      .get(&self.config.base_url)
      .query(&[("s", key), ("callsign", call)])
      .send()
      .await?
      .text()
      .await?;

    parse_response(&body)
  }
}
