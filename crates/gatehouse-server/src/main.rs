//! gatehouse server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, connects the biometric match gateway client, and
//! serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use gatehouse_api::AppState;
use gatehouse_engine::Orchestrator;
use gatehouse_match_http::HttpMatchGateway;
use gatehouse_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gatehouse visit-tracking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "defaults::host")]
  host: String,
  #[serde(default = "defaults::port")]
  port: u16,
  #[serde(default = "defaults::store_path")]
  store_path: PathBuf,
  /// Base URL of the biometric match gateway, e.g. `http://faces.internal`.
  gateway_base_url: String,
  #[serde(default = "defaults::gateway_timeout_secs")]
  gateway_timeout_secs: u64,
}

mod defaults {
  use std::path::PathBuf;

  pub fn host() -> String { "127.0.0.1".into() }
  pub fn port() -> u16 { 8095 }
  pub fn store_path() -> PathBuf { "gatehouse.db".into() }
  pub fn gateway_timeout_secs() -> u64 { 5 }
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
    .add_source(config::Environment::with_prefix("GATEHOUSE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Match gateway client.
  let gateway_timeout = Duration::from_secs(server_cfg.gateway_timeout_secs);
  let gateway = HttpMatchGateway::new(
    server_cfg.gateway_base_url.clone(),
    gateway_timeout,
  )
  .context("failed to build gateway client")?;

  // The SQLite store serves both as visit store and visitor directory.
  let orchestrator = Orchestrator::new(
    Arc::clone(&store),
    Arc::clone(&store),
    Arc::new(gateway),
  )
  .with_gateway_timeout(gateway_timeout);

  let state = AppState { orchestrator, visits: store };
  let app = gatehouse_api::api_router(state)
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

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
