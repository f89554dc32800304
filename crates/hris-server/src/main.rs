//! hris-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the JSON API over HTTP.
//!
//! # Granting the admin role
//!
//! Roles are not editable through the API. An operator grants or revokes
//! them against the same store:
//!
//! ```text
//! hris-server grant-admin alice@example.com
//! hris-server revoke-admin alice@example.com
//! ```
//!
//! A running server picks the change up once its cached role expires
//! (`role_cache_ttl_secs`).

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use hris_core::identity::Role;
use hris_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "HRIS API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Give the admin role to the identity registered under EMAIL.
  GrantAdmin { email: String },
  /// Take the admin role away from the identity registered under EMAIL.
  RevokeAdmin { email: String },
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

  let server_cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;

  let hris = hris_server::open(&server_cfg)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => {
      let app = hris_api::api_router(hris_api::AppState::new(hris));
      let address = server_cfg.address();

      tracing::info!(policy = ?server_cfg.attendance_policy, "Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
    Command::GrantAdmin { email } => set_role(&hris, &email, Role::Admin).await?,
    Command::RevokeAdmin { email } => set_role(&hris, &email, Role::Member).await?,
  }

  Ok(())
}

async fn set_role(
  hris: &hris_core::Hris<hris_store_sqlite::SqliteStore>,
  email: &str,
  role: Role,
) -> anyhow::Result<()> {
  let identity = hris
    .store()
    .find_identity(&email.trim().to_lowercase())
    .await
    .context("failed to look up identity")?
    .with_context(|| format!("no identity registered for {email}"))?;

  hris.assign_role(identity.id, role).await?;
  println!("{} is now {}", identity.email, role.as_str());
  Ok(())
}
