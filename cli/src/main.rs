// rentcart-cli/src/main.rs

mod approval;
mod commands;
mod config;
mod errors;
mod pending;
mod state;

use crate::commands::Args;
use crate::config::AppConfig;
use crate::state::AppState;
use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let config = AppConfig::from_env().context("failed to load configuration")?;
  let state = AppState::new(config).context("failed to open cart storage")?;

  if let Err(e) = commands::run(args, state).await {
    tracing::error!(error = %e, "Command failed.");
    return Err(e.into());
  }
  Ok(())
}
