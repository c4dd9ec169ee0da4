//! `ridgeline` — spot feed ingest and correlation daemon.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite spot store, and runs three tasks until ctrl-c: the activation feed
//! reader, the skimmer feed reader, and the correlation engine.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use ridgeline_daemon::{
  DaemonConfig,
  engine::{EngineConfig, run_engine},
  ingest::{ActivationIngest, SkimmerIngest},
};
use ridgeline_feed::run_feed;
use ridgeline_lookup::{LocationResolver, LookupClient};
use ridgeline_store_sqlite::SqliteStore;
use tokio::sync::watch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Spot feed ingest and correlation daemon")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RIDGELINE"))
    .build()
    .context("failed to read config file")?;

  let cfg: DaemonConfig = settings
    .try_deserialize()
    .context("failed to deserialise DaemonConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let client = match cfg.lookup_config() {
    Some(lookup) => {
      Some(LookupClient::new(lookup).context("building lookup client")?)
    }
    None => {
      tracing::info!("no lookup credentials, external resolution disabled");
      None
    }
  };
  let resolver =
    LocationResolver::new(store.clone(), client, cfg.cache_max_age());

  let (shutdown_tx, shutdown_rx) = watch::channel(false);

  let activation = {
    let sink = ActivationIngest::new(store.clone(), cfg.freshness_horizon());
    let feed = cfg.activation_feed_config();
    let shutdown = shutdown_rx.clone();
    tokio::spawn(async move { run_feed(feed, &sink, shutdown).await })
  };

  let skimmer = {
    let sink = SkimmerIngest::new(store.clone(), cfg.target_callsign.clone());
    let feed = cfg.skimmer_feed_config();
    let shutdown = shutdown_rx.clone();
    tokio::spawn(async move { run_feed(feed, &sink, shutdown).await })
  };

  let engine = {
    let engine_cfg = EngineConfig {
      correlation_cycle: cfg.correlation_cycle(),
      retention_cycle:   cfg.retention_cycle(),
      window:            cfg.match_window(),
      retention_horizon: cfg.retention_horizon(),
    };
    tokio::spawn(run_engine(store.clone(), resolver, engine_cfg, shutdown_rx))
  };

  tracing::info!(
    target = %cfg.target_callsign,
    store = %store_path.display(),
    "ridgeline running"
  );

  tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
  tracing::info!("shutdown requested");
  shutdown_tx.send(true).ok();

  let _ = tokio::join!(activation, skimmer, engine);

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
