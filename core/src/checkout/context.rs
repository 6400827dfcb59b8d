// rentcart/src/checkout/context.rs
use crate::backend::BookingBackend;
use crate::checkout::state::StateCell;
use crate::model::{BookingId, CartItem, CartToken, PaymentAmount};
use crate::provider::{PaymentCapture, PaymentProvider, ProviderOrder};
use crate::store::CartStore;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Collaborators shared by every attempt of one orchestrator.
pub struct CheckoutServices {
  pub store: CartStore,
  pub provider: Arc<dyn PaymentProvider>,
  pub backend: Arc<dyn BookingBackend>,
  pub state: StateCell,
  pub currency_code: String,
}

impl fmt::Debug for CheckoutServices {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CheckoutServices")
      .field("state", &self.state)
      .field("currency_code", &self.currency_code)
      .finish_non_exhaustive()
  }
}

/// Data one checkout attempt accumulates as its steps run.
#[derive(Debug, Clone)]
pub struct CheckoutCtxData {
  pub services: Arc<CheckoutServices>,
  /// Clock reading the attempt validates holds against.
  pub now: DateTime<Utc>,

  pub cart_token: Option<CartToken>,
  pub items: Vec<CartItem>,
  pub amount: Option<PaymentAmount>,
  pub provider_order: Option<ProviderOrder>,
  /// Set once funds moved. From here on the attempt can no longer fall back
  /// to `Idle`.
  pub capture: Option<PaymentCapture>,
  pub booking_ids: Vec<BookingId>,
  pub cart_cleared: bool,
}

impl CheckoutCtxData {
  pub fn new(services: Arc<CheckoutServices>, now: DateTime<Utc>) -> Self {
    Self {
      services,
      now,
      cart_token: None,
      items: Vec::new(),
      amount: None,
      provider_order: None,
      capture: None,
      booking_ids: Vec::new(),
      cart_cleared: false,
    }
  }
}
