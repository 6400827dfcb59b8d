// rentcart/src/provider/mod.rs

//! The external payment provider seam.
//!
//! A provider first creates an order for the cart amount, then (after the
//! buyer approved it on the provider's side) captures it. A successful
//! `capture` is the commit point of a checkout attempt: money has moved.

pub mod mock;
pub mod paypal;

pub use mock::{MockCaptureBehavior, MockPaymentProvider};
pub use paypal::{PaypalConfig, PaypalProvider};

use crate::error::ProviderError;
use crate::model::PaymentAmount;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An order created with the provider, awaiting buyer approval and capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOrder {
  pub id: String,
  pub amount: PaymentAmount,
  /// Where the buyer approves the payment, when the provider needs that.
  pub approve_url: Option<String>,
}

/// Evidence that funds were captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCapture {
  pub order_id: String,
  pub capture_id: String,
  pub status: String,
  /// The provider's raw capture response, forwarded to the backend as
  /// `paypal_details`.
  pub details: serde_json::Value,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
  async fn create_order(&self, amount: &PaymentAmount) -> Result<ProviderOrder, ProviderError>;

  /// Captures funds for an approved order.
  async fn capture(&self, order: &ProviderOrder) -> Result<PaymentCapture, ProviderError>;
}

/// Lets the buyer approve (or walk away from) a provider order before it is
/// captured. A browser front end redirects to `approve_url`; the CLI prints it
/// and waits for confirmation.
#[async_trait]
pub trait BuyerApproval: Send + Sync {
  /// Resolves once the buyer approved; `ProviderError::Cancelled` otherwise.
  async fn await_approval(&self, order: &ProviderOrder) -> Result<(), ProviderError>;
}

/// Approval that is assumed to have happened out of band.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreApproved;

#[async_trait]
impl BuyerApproval for PreApproved {
  async fn await_approval(&self, _order: &ProviderOrder) -> Result<(), ProviderError> {
    Ok(())
  }
}
