// rentcart-cli/src/config.rs

use crate::errors::ConfigError;
use dotenvy::dotenv;
use rentcart::provider::paypal::PAYPAL_SANDBOX_API;
use rentcart::{BackendContract, PaypalConfig};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub api_base_url: String,
  pub api_token: Option<String>,
  pub backend_contract: BackendContract,

  pub storage_dir: PathBuf,
  pub currency_code: String,
  pub currency_symbol: String,
  pub http_timeout: Duration,

  /// Present only when both PayPal credentials are set.
  pub paypal: Option<PaypalConfig>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; blank values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let api_base_url = get("CART_API_BASE_URL").ok_or(ConfigError::Missing("CART_API_BASE_URL"))?;
    let api_token = get("CART_API_TOKEN");
    let backend_contract = match get("CART_BACKEND_CONTRACT").as_deref() {
      None | Some("confirm-payment") => BackendContract::ConfirmPayment,
      Some("two-step") => BackendContract::CheckoutThenComplete,
      Some(other) => {
        return Err(ConfigError::Invalid {
          name: "CART_BACKEND_CONTRACT",
          reason: format!("expected 'confirm-payment' or 'two-step', got '{other}'"),
        })
      }
    };

    let storage_dir = PathBuf::from(get("CART_STORAGE_DIR").unwrap_or_else(|| ".rentcart".to_string()));
    let currency_code = get("CART_CURRENCY_CODE").unwrap_or_else(|| "MYR".to_string());
    let currency_symbol = get("CART_CURRENCY_SYMBOL").unwrap_or_else(|| "RM".to_string());
    let http_timeout = get("CART_HTTP_TIMEOUT_SECS")
      .unwrap_or_else(|| "30".to_string())
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| ConfigError::Invalid {
        name: "CART_HTTP_TIMEOUT_SECS",
        reason: e.to_string(),
      })?;

    let paypal = match (get("PAYPAL_CLIENT_ID"), get("PAYPAL_CLIENT_SECRET")) {
      (Some(client_id), Some(client_secret)) => Some(PaypalConfig {
        api_base: get("PAYPAL_API_BASE").unwrap_or_else(|| PAYPAL_SANDBOX_API.to_string()),
        client_id,
        client_secret,
      }),
      _ => None,
    };

    tracing::info!(%api_base_url, ?backend_contract, storage_dir = %storage_dir.display(), "Configuration loaded.");

    Ok(Self {
      api_base_url,
      api_token,
      backend_contract,
      storage_dir,
      currency_code,
      currency_symbol,
      http_timeout,
      paypal,
    })
  }
}
