// rentcart-cli/src/errors.rs

use rentcart::{CheckoutError, PipelineError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Missing environment variable '{0}'")]
  Missing(&'static str),

  #[error("Invalid value for '{name}': {reason}")]
  Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum CliError {
  #[error("Configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("Cart storage error: {0}")]
  Store(#[from] StoreError),

  #[error("Checkout error: {0}")]
  Checkout(#[from] CheckoutError),

  #[error("Checkout setup error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Could not read cart item file: {0}")]
  ItemFile(String),

  #[error("HTTP client error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Cart item '{0}' not found")]
  ItemNotFound(String),

  #[error("Payment {0} was captured but never confirmed; contact support, then run `rentcart dismiss`")]
  Unreconciled(String),

  #[error("Could not access the unreconciled capture record: {0}")]
  PendingFile(String),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
