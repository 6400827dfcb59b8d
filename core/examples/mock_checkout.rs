// rentcart/examples/mock_checkout.rs

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rentcart::{
  BackendError, BookingBackend, BookingId, CartEvents, CartItem, CartItemId, CartPresenter, CartStore,
  CheckoutOrchestrator, ConfirmPaymentRequest, ConfirmPaymentResponse, MemoryCartRepository, MockPaymentProvider,
  RateType,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

// 1. A backend that books every item it is sent.
struct EchoBackend;

#[async_trait]
impl BookingBackend for EchoBackend {
  async fn confirm_payment(&self, request: &ConfirmPaymentRequest) -> Result<ConfirmPaymentResponse, BackendError> {
    let booking_ids = request
      .cart_items
      .iter()
      .map(|item| BookingId::new(format!("BK-{}", item.id)))
      .collect();
    Ok(ConfirmPaymentResponse { booking_ids })
  }
}

fn item(id: &str, vehicle: &str, total: Decimal, hold: Duration) -> CartItem {
  CartItem {
    id: CartItemId::new(id),
    vehicle: vehicle.to_string(),
    brand: "Perodua".to_string(),
    seats: 5,
    transmission: "auto".to_string(),
    pickup_date: "2026-11-01".to_string(),
    pickup_time: "10:00".to_string(),
    return_date: "2026-11-03".to_string(),
    return_time: "10:00".to_string(),
    pickup_location: "KLIA".to_string(),
    total_days: 2,
    base_price: total,
    cdw_total: Decimal::ZERO,
    total_price: total,
    rate_type: RateType::Weekly,
    first_name: "Aina".to_string(),
    last_name: "Rahman".to_string(),
    email: "aina@example.com".to_string(),
    phone: "+60123456789".to_string(),
    driving_license: "D1234567".to_string(),
    expires_at: Some(Utc::now() + hold),
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Mock Checkout Example ---");

  // 2. Wire the store, a completing mock provider and the backend.
  let store = CartStore::new(Arc::new(MemoryCartRepository::new()), CartEvents::new());
  let orchestrator = CheckoutOrchestrator::new(
    store.clone(),
    Arc::new(MockPaymentProvider::completing()),
    Arc::new(EchoBackend),
    "MYR",
  )?;
  let presenter = CartPresenter::new(store.clone(), orchestrator, "RM");

  // 3. Fill the cart. The second hold has already lapsed.
  store.add_item(item("1", "Axia", Decimal::new(15000, 2), Duration::minutes(15)))?;
  store.add_item(item("2", "Myvi", Decimal::new(9950, 2), Duration::minutes(-1)))?;

  let view = presenter.mount(Utc::now())?;
  info!(rows = view.rows.len(), total = %view.total, "Cart mounted.");

  // 4. Check out.
  let (view, toast) = presenter.checkout(Utc::now()).await?;
  info!(level = ?toast.level, message = %toast.message, "Checkout finished.");
  info!(empty = view.is_empty(), state = %presenter.checkout_state(), "Cart after checkout.");

  Ok(())
}
