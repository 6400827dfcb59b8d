// rentcart/src/backend/mod.rs

//! The rental REST backend, as seen from checkout.

pub mod http;

pub use http::{BackendContract, HttpBookingBackend};

use crate::error::BackendError;
use crate::model::{BookingId, CartItem, CartToken};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `POST /cart/confirm-payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
  pub cart_token: CartToken,
  pub cart_items: Vec<CartItem>,
  pub paypal_details: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
  pub booking_ids: Vec<BookingId>,
}

/// Turns a captured payment into confirmed bookings.
///
/// Called exactly once per checkout attempt, and only after the payment
/// provider reported capture.
#[async_trait]
pub trait BookingBackend: Send + Sync {
  async fn confirm_payment(&self, request: &ConfirmPaymentRequest) -> Result<ConfirmPaymentResponse, BackendError>;
}
