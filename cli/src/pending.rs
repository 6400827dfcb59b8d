// rentcart-cli/src/pending.rs

//! A captured payment the backend never confirmed outlives the process that
//! saw it. It is kept next to the cart until someone dismisses it, and no new
//! checkout starts while it is there.

use crate::errors::{CliError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const FILE_NAME: &str = "unreconciled_capture.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreconciledCapture {
  pub capture_id: String,
  pub reason: String,
  pub recorded_at: DateTime<Utc>,
}

fn path_in(dir: &Path) -> PathBuf {
  dir.join(FILE_NAME)
}

pub fn load(dir: &Path) -> Result<Option<UnreconciledCapture>> {
  let raw = match fs::read_to_string(path_in(dir)) {
    Ok(raw) => raw,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(CliError::PendingFile(e.to_string())),
  };
  serde_json::from_str(&raw)
    .map(Some)
    .map_err(|e| CliError::PendingFile(e.to_string()))
}

pub fn record(dir: &Path, capture: &UnreconciledCapture) -> Result<()> {
  let json = serde_json::to_string_pretty(capture).map_err(|e| CliError::PendingFile(e.to_string()))?;
  fs::create_dir_all(dir).map_err(|e| CliError::PendingFile(e.to_string()))?;
  fs::write(path_in(dir), json).map_err(|e| CliError::PendingFile(e.to_string()))?;
  warn!(capture_id = %capture.capture_id, "Unreconciled capture recorded.");
  Ok(())
}

/// Returns the dismissed record, if there was one.
pub fn dismiss(dir: &Path) -> Result<Option<UnreconciledCapture>> {
  let existing = load(dir)?;
  if let Some(capture) = &existing {
    fs::remove_file(path_in(dir)).map_err(|e| CliError::PendingFile(e.to_string()))?;
    info!(capture_id = %capture.capture_id, "Unreconciled capture dismissed.");
  }
  Ok(existing)
}

/// Refuses to go on while an unreconciled capture is on record.
pub fn ensure_clear(dir: &Path) -> Result<()> {
  match load(dir)? {
    Some(capture) => Err(CliError::Unreconciled(capture.capture_id)),
    None => Ok(()),
  }
}
