//! credence server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `CREDENCE_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! The only required setting is the token secret:
//!
//! ```text
//! CREDENCE_JWT_SECRET=change-me cargo run -p credence-api --bin credence-server
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use credence_api::{AppState, ServerConfig};
use credence_moderation::ModerationClient;
use credence_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Credence claim credibility server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CREDENCE"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.moderation_api_key.is_none() {
    server_cfg.moderation_api_key = std::env::var("OPENAI_API_KEY").ok();
  }
  if server_cfg.moderation_api_key.is_none() {
    tracing::warn!("no moderation API key; claims will be stored unmoderated");
  }

  let database_path = expand_tilde(&server_cfg.database_path);
  if let Some(parent) = database_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open store at {database_path:?}"))?;

  let moderation = ModerationClient::new(server_cfg.moderation_config())
    .context("failed to build moderation client")?;

  let state = AppState {
    store:      Arc::new(store),
    tokens:     Arc::new(server_cfg.token_issuer()),
    moderation: Arc::new(moderation),
  };

  let app = credence_api::router(state);
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
