//! `hris` — terminal client for the HRIS API.
//!
//! # Usage
//!
//! ```text
//! hris --url http://localhost:8080 --email ada@example.com --password secret
//! hris --config ~/.config/hris/config.toml check-in
//! hris sign-up --name "Ada Lovelace" --position Engineer --department Research
//! ```
//!
//! Without a subcommand the interactive TUI starts.

mod app;
mod client;
mod commands;
mod reconcile;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, HttpAuth};
use commands::Command;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use hris_core::session::{Credentials, Registration, SessionContext};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hris", about = "Terminal client for the HRIS")]
struct Args {
  /// Path to a TOML config file (url, email, password). Defaults to
  /// ~/.config/hris/config.toml when that exists.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the HRIS server (default: http://localhost:8080).
  #[arg(long, env = "HRIS_URL")]
  url: Option<String>,

  #[arg(long, env = "HRIS_EMAIL")]
  email: Option<String>,

  /// Account password (plaintext).
  #[arg(long, env = "HRIS_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

/// Connection settings after merging flags over the config file.
#[derive(Debug, PartialEq, Eq)]
struct Settings {
  url:      String,
  email:    String,
  password: String,
}

fn default_config_path() -> Option<PathBuf> {
  let home = std::env::var_os("HOME")?;
  let path = Path::new(&home).join(".config/hris/config.toml");
  path.exists().then_some(path)
}

fn read_config(path: Option<&Path>) -> Result<ConfigFile> {
  let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(&path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

/// CLI flags override the config file, which overrides defaults.
fn merge(
  url: Option<String>,
  email: Option<String>,
  password: Option<String>,
  file: ConfigFile,
) -> Settings {
  let pick = |flag: Option<String>, from_file: String| {
    flag.or_else(|| (!from_file.is_empty()).then_some(from_file))
  };
  Settings {
    url:      pick(url, file.url).unwrap_or_else(|| DEFAULT_URL.to_owned()),
    email:    pick(email, file.email).unwrap_or_default(),
    password: pick(password, file.password).unwrap_or_default(),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let tui = matches!(args.command, None | Some(Command::Tui));

  // Log lines would tear the TUI, so only one-shot commands get a subscriber.
  if !tui {
    tracing_subscriber::fmt()
      .with_writer(io::stderr)
      .with_env_filter(
        EnvFilter::builder().with_default_directive(LevelFilter::WARN.into()).from_env_lossy(),
      )
      .init();
  }

  let file_cfg = read_config(args.config.as_deref())?;
  let settings = merge(args.url, args.email, args.password, file_cfg);

  let client = ApiClient::new(&settings.url)?;
  let session = SessionContext::new(HttpAuth::new(&client));

  if let Some(Command::SignUp { name, position, department }) = args.command {
    let identity = session
      .sign_up(Registration {
        email: settings.email,
        password: settings.password,
        name,
        position,
        department,
      })
      .await
      .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("registered {} ({})", identity.email, identity.id);
    return Ok(());
  }

  if settings.email.is_empty() {
    anyhow::bail!("no email given; pass --email, set HRIS_EMAIL or add it to the config file");
  }
  session
    .sign_in(Credentials { email: settings.email, password: settings.password })
    .await
    .map_err(|e| anyhow::anyhow!(e.user_message()))?;

  let result = match args.command {
    Some(command) if !tui => commands::run(&client, command).await,
    _ => run_tui(&client).await,
  };

  session.sign_out().await?;
  result
}

// ─── TUI ──────────────────────────────────────────────────────────────────────

async fn run_tui(client: &ApiClient) -> Result<()> {
  let account = client.me().await?;
  let mut app = App::new(client, account);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.load_all().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<'_>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
