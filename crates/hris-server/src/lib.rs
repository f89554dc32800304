//! Server configuration and wiring for the `hris-server` binary.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use config::{ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use hris_core::{Hris, HrisConfig, attendance::MarkingPolicy};
use hris_store_sqlite::SqliteStore;
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `HRIS_`-prefixed environment overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub attendance_policy:   MarkingPolicy,
  pub role_cache_ttl_secs: u64,
  pub call_timeout_secs:   u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let engines = HrisConfig::default();
    Self {
      host:                "127.0.0.1".to_owned(),
      port:                8080,
      store_path:          PathBuf::from("hris.db"),
      attendance_policy:   engines.attendance_policy,
      role_cache_ttl_secs: engines.role_cache_ttl_secs,
      call_timeout_secs:   engines.call_timeout_secs,
    }
  }
}

impl ServerConfig {
  /// Read `path` (optional) and the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("HRIS")),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The subset handed to the engines.
  pub fn hris_config(&self) -> HrisConfig {
    HrisConfig {
      attendance_policy:   self.attendance_policy,
      role_cache_ttl_secs: self.role_cache_ttl_secs,
      call_timeout_secs:   self.call_timeout_secs,
    }
  }
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

/// Open the store named by `config` and build the engine context over it.
pub async fn open(config: &ServerConfig) -> hris_store_sqlite::Result<Arc<Hris<SqliteStore>>> {
  let store = SqliteStore::open(expand_tilde(&config.store_path)).await?;
  Ok(Arc::new(Hris::new(Arc::new(store), &config.hris_config())))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
