// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rentcart::{
  BackendError, BookingBackend, BookingId, CartEvents, CartItem, CartItemId, CartRepository, CartStore, CartToken,
  ConfirmPaymentRequest, ConfirmPaymentResponse, MemoryCartRepository, RateType, StoreError, StoreResult,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Level;

// --- Fixtures ---

pub fn money(raw: &str) -> Decimal {
  Decimal::from_str(raw).expect("valid decimal literal")
}

/// A complete, bookable item priced at `total` whose hold ends at `expires_at`.
pub fn cart_item(id: &str, total: &str, expires_at: DateTime<Utc>) -> CartItem {
  CartItem {
    id: CartItemId::new(id),
    vehicle: format!("Vehicle {id}"),
    brand: "Perodua".to_string(),
    seats: 5,
    transmission: "auto".to_string(),
    pickup_date: "2026-11-01".to_string(),
    pickup_time: "10:00".to_string(),
    return_date: "2026-11-03".to_string(),
    return_time: "10:00".to_string(),
    pickup_location: "KLIA".to_string(),
    total_days: 2,
    base_price: money(total),
    cdw_total: Decimal::ZERO,
    total_price: money(total),
    rate_type: RateType::Daily,
    first_name: "Aina".to_string(),
    last_name: "Rahman".to_string(),
    email: "aina@example.com".to_string(),
    phone: "+60123456789".to_string(),
    driving_license: "D1234567".to_string(),
    expires_at: Some(expires_at),
  }
}

/// An item whose hold runs for another 30 minutes after `now`.
pub fn live_item(id: &str, total: &str, now: DateTime<Utc>) -> CartItem {
  cart_item(id, total, now + Duration::minutes(30))
}

pub fn memory_store() -> (CartStore, Arc<MemoryCartRepository>) {
  let repo = Arc::new(MemoryCartRepository::new());
  let store = CartStore::new(repo.clone(), CartEvents::new());
  (store, repo)
}

/// Store pre-filled with `items` under a fixed token.
pub fn seeded_store(items: &[CartItem]) -> (CartStore, Arc<MemoryCartRepository>, CartToken) {
  let (store, repo) = memory_store();
  let token = CartToken::new("tok-123");
  store.save(&token, items).expect("seed store");
  (store, repo, token)
}

// --- Fakes ---

/// Booking backend that records every request and answers from a script.
pub struct RecordingBackend {
  answer: Mutex<Result<ConfirmPaymentResponse, BackendError>>,
  requests: Mutex<Vec<ConfirmPaymentRequest>>,
}

impl RecordingBackend {
  pub fn confirming(booking_ids: &[&str]) -> Self {
    Self::answering(Ok(ConfirmPaymentResponse {
      booking_ids: booking_ids.iter().map(|id| BookingId::new(*id)).collect(),
    }))
  }

  pub fn failing(error: BackendError) -> Self {
    Self::answering(Err(error))
  }

  fn answering(answer: Result<ConfirmPaymentResponse, BackendError>) -> Self {
    Self {
      answer: Mutex::new(answer),
      requests: Mutex::new(Vec::new()),
    }
  }

  pub fn requests(&self) -> Vec<ConfirmPaymentRequest> {
    self.requests.lock().clone()
  }
}

#[async_trait]
impl BookingBackend for RecordingBackend {
  async fn confirm_payment(&self, request: &ConfirmPaymentRequest) -> Result<ConfirmPaymentResponse, BackendError> {
    self.requests.lock().push(request.clone());
    self.answer.lock().clone()
  }
}

/// Memory repository whose `clear` always fails.
#[derive(Default)]
pub struct StuckRepository {
  inner: MemoryCartRepository,
}

impl CartRepository for StuckRepository {
  fn load_token(&self) -> StoreResult<Option<CartToken>> {
    self.inner.load_token()
  }

  fn load_items(&self, token: &CartToken) -> StoreResult<Vec<CartItem>> {
    self.inner.load_items(token)
  }

  fn save_token(&self, token: &CartToken) -> StoreResult<()> {
    self.inner.save_token(token)
  }

  fn save_items(&self, token: &CartToken, items: &[CartItem]) -> StoreResult<()> {
    self.inner.save_items(token, items)
  }

  fn clear(&self, _token: &CartToken) -> StoreResult<()> {
    Err(StoreError::Io(std::io::Error::other("storage is read-only")))
  }
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
