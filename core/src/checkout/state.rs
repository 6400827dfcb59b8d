// rentcart/src/checkout/state.rs
use crate::error::CheckoutError;
use crate::model::BookingId;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Where the current checkout attempt stands.
///
/// ```text
/// Idle -> Validating -> AwaitingProviderCapture -> ConfirmingWithBackend -> Success
///                                                                        \-> ReconciliationNeeded
/// ```
/// Validation and provider failures fall back to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
  #[default]
  Idle,
  Validating,
  AwaitingProviderCapture,
  ConfirmingWithBackend,
  Success { booking_ids: Vec<BookingId> },
  /// Funds were captured but the backend never confirmed the bookings.
  ReconciliationNeeded { capture_id: String, reason: String },
}

impl CheckoutState {
  /// An attempt is running; no new submission may start.
  pub fn is_in_flight(&self) -> bool {
    matches!(
      self,
      CheckoutState::Validating | CheckoutState::AwaitingProviderCapture | CheckoutState::ConfirmingWithBackend
    )
  }

  /// The attempt finished with an outcome the user has to acknowledge.
  pub fn is_resting(&self) -> bool {
    matches!(
      self,
      CheckoutState::Success { .. } | CheckoutState::ReconciliationNeeded { .. }
    )
  }
}

impl fmt::Display for CheckoutState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CheckoutState::Idle => f.write_str("Idle"),
      CheckoutState::Validating => f.write_str("Validating"),
      CheckoutState::AwaitingProviderCapture => f.write_str("AwaitingProviderCapture"),
      CheckoutState::ConfirmingWithBackend => f.write_str("ConfirmingWithBackend"),
      CheckoutState::Success { .. } => f.write_str("Success"),
      CheckoutState::ReconciliationNeeded { capture_id, .. } => write!(f, "ReconciliationNeeded({capture_id})"),
    }
  }
}

/// Shared, lock-protected `CheckoutState`. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct StateCell(Arc<Mutex<CheckoutState>>);

impl StateCell {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self) -> CheckoutState {
    self.0.lock().clone()
  }

  /// Moves `Idle` to `Validating` in one step under the lock.
  pub fn begin(&self) -> Result<(), CheckoutError> {
    let mut state = self.0.lock();
    match &*state {
      CheckoutState::Idle => {
        *state = CheckoutState::Validating;
        info!(to = "Validating", "Checkout attempt started.");
        Ok(())
      }
      current if current.is_resting() => Err(CheckoutError::AttemptUnresolved(current.clone())),
      current => Err(CheckoutError::AttemptInProgress(current.clone())),
    }
  }

  pub fn set(&self, next: CheckoutState) {
    let mut state = self.0.lock();
    info!(from = %*state, to = %next, "Checkout state transition.");
    *state = next;
  }

  /// Acknowledges a finished attempt. Refused while an attempt is running.
  pub fn reset(&self) -> Result<(), CheckoutError> {
    let mut state = self.0.lock();
    if state.is_in_flight() {
      return Err(CheckoutError::AttemptInProgress(state.clone()));
    }
    *state = CheckoutState::Idle;
    Ok(())
  }
}
