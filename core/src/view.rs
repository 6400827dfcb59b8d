// rentcart/src/view.rs

//! Display model for the cart page and the glue that keeps it in step with
//! the store and the checkout orchestrator.

use crate::checkout::{CheckoutOrchestrator, CheckoutReceipt, CheckoutState};
use crate::error::{CheckoutError, ProviderError, StoreResult, ValidationError};
use crate::model::{cart_total, format_display, CartItem, CartItemId};
use crate::store::CartStore;
use chrono::{DateTime, Utc};
use tracing::instrument;

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
  pub id: CartItemId,
  pub vehicle: String,
  pub brand: String,
  pub seats: u32,
  pub transmission: String,
  /// e.g. `2026-11-01 10:00 to 2026-11-03 10:00`
  pub schedule: String,
  pub location: String,
  pub days: u32,
  pub base_price: String,
  pub cdw_total: String,
  pub total_price: String,
  pub discount_label: Option<&'static str>,
}

impl CartRow {
  pub fn build(item: &CartItem, currency_symbol: &str) -> Self {
    Self {
      id: item.id.clone(),
      vehicle: item.vehicle.clone(),
      brand: item.brand.clone(),
      seats: item.seats,
      transmission: item.transmission.clone(),
      schedule: format!(
        "{} {} to {} {}",
        item.pickup_date, item.pickup_time, item.return_date, item.return_time
      ),
      location: item.pickup_location.clone(),
      days: item.total_days,
      base_price: format_display(currency_symbol, item.base_price),
      cdw_total: format_display(currency_symbol, item.cdw_total),
      total_price: format_display(currency_symbol, item.total_price),
      discount_label: item.rate_type.discount_label(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
  pub rows: Vec<CartRow>,
  /// e.g. `RM 249.50`
  pub total: String,
}

impl CartView {
  pub fn build(items: &[CartItem], currency_symbol: &str) -> Self {
    Self {
      rows: items.iter().map(|item| CartRow::build(item, currency_symbol)).collect(),
      total: format_display(currency_symbol, cart_total(items)),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
  Success,
  Info,
  Warning,
  Error,
}

/// A short user-facing notice. Persistent toasts stay until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub level: ToastLevel,
  pub message: String,
  pub persistent: bool,
}

impl Toast {
  fn new(level: ToastLevel, message: impl Into<String>) -> Self {
    Self {
      level,
      message: message.into(),
      persistent: false,
    }
  }

  pub fn for_checkout(result: &Result<CheckoutReceipt, CheckoutError>) -> Self {
    match result {
      Ok(receipt) => Self::new(
        ToastLevel::Success,
        format!("Booking confirmed. Booking id(s): {}", join_ids(&receipt.booking_ids)),
      ),
      Err(e) => Self::for_error(e),
    }
  }

  pub fn for_error(error: &CheckoutError) -> Self {
    match error {
      CheckoutError::Validation(ValidationError::EmptyCart) => Self::new(ToastLevel::Warning, "Your cart is empty."),
      CheckoutError::Validation(ValidationError::ExpiredItems { item_ids }) => Self::new(
        ToastLevel::Warning,
        format!(
          "The reservation hold has expired for {} item(s). Remove them and book again.",
          item_ids.len()
        ),
      ),
      CheckoutError::Validation(ValidationError::IncompleteCustomerInfo { item_ids }) => Self::new(
        ToastLevel::Warning,
        format!(
          "Please fill in first name, last name, email and phone for {} item(s).",
          item_ids.len()
        ),
      ),
      CheckoutError::Provider(ProviderError::Cancelled) => {
        Self::new(ToastLevel::Info, "Payment was cancelled. You have not been charged.")
      }
      CheckoutError::Provider(ProviderError::Declined(reason)) => Self::new(
        ToastLevel::Error,
        format!("Payment was not completed ({reason}). You have not been charged."),
      ),
      CheckoutError::Provider(_) => Self::new(
        ToastLevel::Error,
        "Payment was not completed. You have not been charged. Please try again.",
      ),
      CheckoutError::Reconciliation(e) => Self {
        level: ToastLevel::Error,
        message: format!(
          "Your payment was captured (reference {}) but the booking could not be confirmed. Please contact support with this reference.",
          e.capture.capture_id
        ),
        persistent: true,
      },
      CheckoutError::AttemptInProgress(_) => Self::new(ToastLevel::Info, "Checkout is already in progress."),
      CheckoutError::AttemptUnresolved(CheckoutState::ReconciliationNeeded { capture_id, .. }) => Self {
        level: ToastLevel::Error,
        message: format!("Payment {capture_id} still needs to be matched to a booking. Please contact support."),
        persistent: true,
      },
      CheckoutError::AttemptUnresolved(_) => {
        Self::new(ToastLevel::Info, "Dismiss the previous checkout result before submitting again.")
      }
      CheckoutError::Store(_) | CheckoutError::Pipeline(_) | CheckoutError::Internal(_) => {
        Self::new(ToastLevel::Error, format!("Checkout failed: {error}"))
      }
    }
  }
}

fn join_ids(ids: &[impl ToString]) -> String {
  ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Keeps a `CartView` in step with the store and runs checkout for it.
#[derive(Clone)]
pub struct CartPresenter {
  store: CartStore,
  orchestrator: CheckoutOrchestrator,
  currency_symbol: String,
}

impl CartPresenter {
  pub fn new(store: CartStore, orchestrator: CheckoutOrchestrator, currency_symbol: impl Into<String>) -> Self {
    Self {
      store,
      orchestrator,
      currency_symbol: currency_symbol.into(),
    }
  }

  /// Loads the cart, dropping (and persisting the removal of) expired items.
  #[instrument(name = "CartPresenter::mount", skip(self))]
  pub fn mount(&self, now: DateTime<Utc>) -> StoreResult<CartView> {
    let items = self.store.load_live(now)?.map(|session| session.items).unwrap_or_default();
    Ok(CartView::build(&items, &self.currency_symbol))
  }

  pub fn remove(&self, item_id: &CartItemId, now: DateTime<Utc>) -> StoreResult<CartView> {
    self.store.remove_item(item_id)?;
    self.mount(now)
  }

  pub fn clear(&self) -> StoreResult<CartView> {
    self.store.clear()?;
    Ok(CartView::build(&[], &self.currency_symbol))
  }

  /// Header badge count.
  pub fn count(&self) -> StoreResult<usize> {
    self.store.count()
  }

  pub fn checkout_state(&self) -> CheckoutState {
    self.orchestrator.state()
  }

  /// Dismisses a finished checkout result.
  pub fn dismiss(&self) -> Result<(), CheckoutError> {
    self.orchestrator.reset()
  }

  /// Submits the cart and re-renders it with the outcome.
  pub async fn checkout(&self, now: DateTime<Utc>) -> StoreResult<(CartView, Toast)> {
    let result = self.orchestrator.checkout(now).await;
    let toast = Toast::for_checkout(&result);
    Ok((self.mount(now)?, toast))
  }
}
