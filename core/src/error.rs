// rentcart/src/error.rs
use crate::checkout::state::CheckoutState;
use crate::model::{BookingId, CartItemId};
use crate::pipeline::PipelineError;
use crate::provider::PaymentCapture;
use thiserror::Error;

/// Local persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Cart storage I/O failed: {0}")]
  Io(#[from] std::io::Error),

  #[error("Cart storage holds unreadable data: {0}")]
  Serde(#[from] serde_json::Error),
}

/// Reasons a cart may not be submitted. Recoverable by the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("The cart is empty")]
  EmptyCart,

  #[error("The reservation hold has expired for {} item(s)", .item_ids.len())]
  ExpiredItems { item_ids: Vec<CartItemId> },

  #[error("Customer details are incomplete for {} item(s)", .item_ids.len())]
  IncompleteCustomerInfo { item_ids: Vec<CartItemId> },
}

/// The payment provider did not capture funds. Nothing was charged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
  #[error("Payment was declined: {0}")]
  Declined(String),

  #[error("Payment was cancelled by the buyer")]
  Cancelled,

  #[error("Payment provider request failed: {0}")]
  Request(String),

  #[error("Payment provider error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("Unexpected payment provider response: {0}")]
  Parse(String),
}

/// Failures talking to the rental backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
  #[error("Backend request failed: {0}")]
  Request(String),

  #[error("Backend error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("Unexpected backend response: {0}")]
  Parse(String),

  /// Bookings were created but marking them paid failed.
  #[error("Bookings {booking_ids:?} were created but could not be marked paid: {source}")]
  Finalize {
    booking_ids: Vec<BookingId>,
    #[source]
    source: Box<BackendError>,
  },
}

impl BackendError {
  /// Booking ids the backend already created before failing.
  pub fn created_booking_ids(&self) -> &[BookingId] {
    match self {
      BackendError::Finalize { booking_ids, .. } => booking_ids,
      _ => &[],
    }
  }
}

/// Funds were captured but the backend did not confirm the bookings. The cart
/// is left intact so the payment can be matched up manually.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Payment {} was captured but booking confirmation failed: {source}", .capture.capture_id)]
pub struct ReconciliationError {
  pub capture: PaymentCapture,
  pub booking_ids: Vec<BookingId>,
  #[source]
  pub source: BackendError,
}

/// Everything a checkout attempt can end with other than success.
#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Provider(#[from] ProviderError),

  #[error(transparent)]
  Reconciliation(#[from] ReconciliationError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("A checkout attempt is already in progress ({0})")]
  AttemptInProgress(CheckoutState),

  #[error("The previous checkout attempt ended in {0}; reset it before submitting again")]
  AttemptUnresolved(CheckoutState),

  #[error("Checkout pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Checkout attempt stopped unexpectedly: {0}")]
  Internal(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
