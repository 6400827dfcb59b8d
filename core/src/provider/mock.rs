// rentcart/src/provider/mock.rs
use crate::error::ProviderError;
use crate::model::PaymentAmount;
use crate::provider::{PaymentCapture, PaymentProvider, ProviderOrder};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// What the mock does when asked to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCaptureBehavior {
  Complete,
  Decline(String),
  Cancel,
}

/// In-process stand-in for the payment provider. Always creates orders;
/// capture follows the configured behavior.
#[derive(Debug)]
pub struct MockPaymentProvider {
  behavior: Mutex<MockCaptureBehavior>,
  latency: Duration,
  orders_created: AtomicUsize,
  captures_attempted: AtomicUsize,
}

impl MockPaymentProvider {
  pub fn new(behavior: MockCaptureBehavior) -> Self {
    Self {
      behavior: Mutex::new(behavior),
      latency: Duration::ZERO,
      orders_created: AtomicUsize::new(0),
      captures_attempted: AtomicUsize::new(0),
    }
  }

  pub fn completing() -> Self {
    Self::new(MockCaptureBehavior::Complete)
  }

  /// Simulated network latency per call.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn set_behavior(&self, behavior: MockCaptureBehavior) {
    *self.behavior.lock() = behavior;
  }

  pub fn orders_created(&self) -> usize {
    self.orders_created.load(Ordering::SeqCst)
  }

  pub fn captures_attempted(&self) -> usize {
    self.captures_attempted.load(Ordering::SeqCst)
  }

  async fn simulate_latency(&self) {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
  }
}

impl Default for MockPaymentProvider {
  fn default() -> Self {
    Self::completing()
  }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
  #[instrument(name = "MockPaymentProvider::create_order", skip(self), fields(value = %amount.value, currency = %amount.currency_code))]
  async fn create_order(&self, amount: &PaymentAmount) -> Result<ProviderOrder, ProviderError> {
    self.simulate_latency().await;
    self.orders_created.fetch_add(1, Ordering::SeqCst);
    let id = format!("mock_order_{}", Uuid::new_v4().simple());
    info!(order_id = %id, "Simulated provider order created.");
    Ok(ProviderOrder {
      id,
      amount: amount.clone(),
      approve_url: None,
    })
  }

  #[instrument(name = "MockPaymentProvider::capture", skip_all, fields(order_id = %order.id))]
  async fn capture(&self, order: &ProviderOrder) -> Result<PaymentCapture, ProviderError> {
    self.simulate_latency().await;
    self.captures_attempted.fetch_add(1, Ordering::SeqCst);
    let behavior = self.behavior.lock().clone();
    match behavior {
      MockCaptureBehavior::Complete => {
        let capture_id = format!("mock_capture_{}", Uuid::new_v4().simple());
        info!(%capture_id, "Simulated capture COMPLETED.");
        Ok(PaymentCapture {
          order_id: order.id.clone(),
          capture_id: capture_id.clone(),
          status: "COMPLETED".to_string(),
          details: json!({
            "id": order.id,
            "status": "COMPLETED",
            "purchase_units": [{
              "payments": {
                "captures": [{
                  "id": capture_id,
                  "status": "COMPLETED",
                  "amount": { "currency_code": order.amount.currency_code, "value": order.amount.value },
                }]
              }
            }]
          }),
        })
      }
      MockCaptureBehavior::Decline(reason) => {
        info!(%reason, "Simulated capture DECLINED.");
        Err(ProviderError::Declined(reason))
      }
      MockCaptureBehavior::Cancel => {
        info!("Simulated buyer cancellation.");
        Err(ProviderError::Cancelled)
      }
    }
  }
}
