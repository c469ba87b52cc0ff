//! glean-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store for the schema registry, and serves the JSON API
//! over HTTP. The registry is seeded with the built-in demo tables on first
//! run (or after the stored snapshot turns out to be unreadable).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use glean_api::AppState;
use glean_core::{
  context::ContextFacts, registry::SchemaRegistry, store::RegistryStore as _,
  table::seed_tables,
};
use glean_gemini::{GeminiClient, GeminiConfig};
use glean_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  host:            String,
  port:            u16,
  store_path:      PathBuf,
  gemini_api_key:  String,
  gemini_model:    Option<String>,
  gemini_base_url: Option<String>,
  /// Currency used in the prompt context. Defaults to USD.
  currency:        Option<String>,
}

#[derive(Parser)]
#[command(author, version, about = "Glean warehouse-insight server")]
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
    .add_source(config::Environment::with_prefix("GLEAN"))
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

  // Load the registry snapshot or seed the demo tables.
  let registry = match store.load().await.context("failed to load registry")? {
    Some(snapshot) => {
      tracing::info!(tables = snapshot.len(), "loaded registry snapshot");
      SchemaRegistry::from_snapshot(snapshot)
    }
    None => {
      tracing::info!("no stored registry; seeding demo tables");
      let registry = SchemaRegistry::from_snapshot(seed_tables());
      store
        .save(&registry.snapshot())
        .await
        .context("failed to persist seeded registry")?;
      registry
    }
  };

  // Gemini backend.
  let mut gemini_cfg = GeminiConfig::new(server_cfg.gemini_api_key.clone());
  if let Some(model) = &server_cfg.gemini_model {
    gemini_cfg.model = model.clone();
  }
  if let Some(base_url) = &server_cfg.gemini_base_url {
    gemini_cfg.base_url = base_url.clone();
  }
  let backend = GeminiClient::new(gemini_cfg).context("failed to build Gemini client")?;

  let mut facts = ContextFacts::default();
  if let Some(currency) = &server_cfg.currency {
    facts.currency = currency.clone();
  }

  let state = AppState::new(registry, store, backend, facts);
  let app = glean_api::router(state).layer(TraceLayer::new_for_http());

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
