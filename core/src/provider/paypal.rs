// rentcart/src/provider/paypal.rs

//! PayPal Orders v2 provider.
//!
//! Flow: OAuth2 client-credentials token → create an order with intent
//! `CAPTURE` → buyer approval via `BuyerApproval` → capture. Only a capture
//! reported as `COMPLETED` counts as success.

use crate::error::ProviderError;
use crate::model::PaymentAmount;
use crate::provider::{BuyerApproval, PaymentCapture, PaymentProvider, ProviderOrder};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub const PAYPAL_SANDBOX_API: &str = "https://api-m.sandbox.paypal.com";

#[derive(Debug, Clone)]
pub struct PaypalConfig {
  pub api_base: String,
  pub client_id: String,
  pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
  expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct OrderLink {
  href: String,
  rel: String,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
  id: String,
  #[serde(default)]
  links: Vec<OrderLink>,
}

struct CachedToken {
  value: String,
  valid_until: Instant,
}

pub struct PaypalProvider {
  client: Client,
  config: PaypalConfig,
  approval: Arc<dyn BuyerApproval>,
  token: Mutex<Option<CachedToken>>,
}

impl PaypalProvider {
  pub fn new(client: Client, config: PaypalConfig, approval: Arc<dyn BuyerApproval>) -> Self {
    Self {
      client,
      config,
      approval,
      token: Mutex::new(None),
    }
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
  }

  async fn access_token(&self) -> Result<String, ProviderError> {
    let cached = self
      .token
      .lock()
      .as_ref()
      .filter(|cached| cached.valid_until > Instant::now())
      .map(|cached| cached.value.clone());
    if let Some(value) = cached {
      return Ok(value);
    }

    let response = self
      .client
      .post(self.url("/v1/oauth2/token"))
      .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
      .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body("grant_type=client_credentials")
      .send()
      .await
      .map_err(|e| ProviderError::Request(e.to_string()))?;
    let token: TokenResponse = read_json(response).await?;

    // Treated as stale a minute before PayPal's own expiry.
    let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60));
    *self.token.lock() = Some(CachedToken {
      value: token.access_token.clone(),
      valid_until: Instant::now() + lifetime,
    });
    debug!("PayPal access token refreshed.");
    Ok(token.access_token)
  }
}

#[async_trait]
impl PaymentProvider for PaypalProvider {
  #[instrument(name = "PaypalProvider::create_order", skip(self), fields(value = %amount.value, currency = %amount.currency_code), err(Display))]
  async fn create_order(&self, amount: &PaymentAmount) -> Result<ProviderOrder, ProviderError> {
    let token = self.access_token().await?;
    let body = json!({
      "intent": "CAPTURE",
      "purchase_units": [{
        "amount": { "currency_code": amount.currency_code, "value": amount.value }
      }]
    });
    let response = self
      .client
      .post(self.url("/v2/checkout/orders"))
      .bearer_auth(token)
      .json(&body)
      .send()
      .await
      .map_err(|e| ProviderError::Request(e.to_string()))?;
    let created: CreatedOrder = read_json(response).await?;

    let approve_url = created
      .links
      .into_iter()
      .find(|link| link.rel == "approve" || link.rel == "payer-action")
      .map(|link| link.href);
    info!(order_id = %created.id, "PayPal order created.");
    Ok(ProviderOrder {
      id: created.id,
      amount: amount.clone(),
      approve_url,
    })
  }

  #[instrument(name = "PaypalProvider::capture", skip_all, fields(order_id = %order.id), err(Display))]
  async fn capture(&self, order: &ProviderOrder) -> Result<PaymentCapture, ProviderError> {
    self.approval.await_approval(order).await?;

    let token = self.access_token().await?;
    let response = self
      .client
      .post(self.url(&format!("/v2/checkout/orders/{}/capture", order.id)))
      .bearer_auth(token)
      .json(&json!({}))
      .send()
      .await
      .map_err(|e| ProviderError::Request(e.to_string()))?;

    if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
      let message = response.text().await.unwrap_or_default();
      warn!(%message, "PayPal refused the capture.");
      return Err(ProviderError::Declined(message));
    }
    let details: serde_json::Value = read_json(response).await?;

    let status = details["status"].as_str().unwrap_or_default().to_string();
    if status != "COMPLETED" {
      return Err(ProviderError::Declined(format!("order status {status:?}")));
    }
    // COMPLETED means funds moved, capture id or not.
    let capture_id = match details["purchase_units"][0]["payments"]["captures"][0]["id"].as_str() {
      Some(id) => id.to_string(),
      None => {
        warn!("COMPLETED capture carries no capture id; using the order id.");
        order.id.clone()
      }
    };

    info!(%capture_id, "PayPal capture COMPLETED.");
    Ok(PaymentCapture {
      order_id: order.id.clone(),
      capture_id,
      status,
      details,
    })
  }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
  let status = response.status();
  if !status.is_success() {
    let message = response.text().await.unwrap_or_default();
    return Err(ProviderError::Api {
      status: status.as_u16(),
      message,
    });
  }
  response
    .json::<T>()
    .await
    .map_err(|e| ProviderError::Parse(e.to_string()))
}
