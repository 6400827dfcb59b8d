// tests/checkout_tests.rs
mod common;
use chrono::{Duration, Utc};
use common::*;
use rentcart::{
  BackendError, BookingId, CartChanged, CartEvents, CartItemId, CartRepository, CartStore, CheckoutError,
  CheckoutOrchestrator, CheckoutState, MockCaptureBehavior, MockPaymentProvider, ProviderError, ValidationError,
};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration as StdDuration;

fn orchestrator(
  store: &CartStore,
  provider: &Arc<MockPaymentProvider>,
  backend: &Arc<RecordingBackend>,
) -> CheckoutOrchestrator {
  CheckoutOrchestrator::new(store.clone(), provider.clone(), backend.clone(), "MYR").unwrap()
}

#[tokio::test]
#[serial]
async fn successful_checkout_clears_the_cart() {
  setup_tracing();
  let now = Utc::now();
  let (store, repo, token) = seeded_store(&[live_item("1", "150.00", now), live_item("2", "99.50", now)]);
  let mut changes = store.events().subscribe();
  let provider = Arc::new(MockPaymentProvider::completing());
  let backend = Arc::new(RecordingBackend::confirming(&["501", "502"]));
  let checkout = orchestrator(&store, &provider, &backend);

  let receipt = checkout.checkout(now).await.unwrap();
  assert_eq!(receipt.cart_token, token);
  assert_eq!(receipt.amount.value, "249.50");
  assert_eq!(receipt.amount.currency_code, "MYR");
  assert_eq!(receipt.booking_ids, vec![BookingId::new("501"), BookingId::new("502")]);
  assert!(receipt.cart_cleared);

  assert_eq!(
    checkout.state(),
    CheckoutState::Success {
      booking_ids: vec![BookingId::new("501"), BookingId::new("502")]
    }
  );
  assert_eq!(store.load().unwrap(), (None, Vec::new()));
  assert!(repo.load_items(&token).unwrap().is_empty());
  assert_eq!(changes.try_recv(), Ok(CartChanged));

  let requests = backend.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].cart_token, token);
  assert_eq!(requests[0].cart_items.len(), 2);
  assert_eq!(requests[0].paypal_details["status"], "COMPLETED");
  assert_eq!(
    requests[0].paypal_details["purchase_units"][0]["payments"]["captures"][0]["id"],
    receipt.capture.capture_id.as_str()
  );
}

#[tokio::test]
#[serial]
async fn backend_failure_after_capture_needs_reconciliation() {
  setup_tracing();
  let now = Utc::now();
  let items = [live_item("1", "150.00", now), live_item("2", "99.50", now)];
  let (store, repo, token) = seeded_store(&items);
  let provider = Arc::new(MockPaymentProvider::completing());
  let backend = Arc::new(RecordingBackend::failing(BackendError::Request(
    "connection reset".to_string(),
  )));
  let checkout = orchestrator(&store, &provider, &backend);

  let reconciliation = match checkout.checkout(now).await {
    Err(CheckoutError::Reconciliation(e)) => e,
    other => panic!("expected a reconciliation error, got {other:?}"),
  };
  assert_eq!(reconciliation.source, BackendError::Request("connection reset".to_string()));
  assert!(reconciliation.booking_ids.is_empty());

  match checkout.state() {
    CheckoutState::ReconciliationNeeded { capture_id, reason } => {
      assert_eq!(capture_id, reconciliation.capture.capture_id);
      assert!(reason.contains("connection reset"));
    }
    other => panic!("expected ReconciliationNeeded, got {other:?}"),
  }

  // The cart is untouched so the payment can be matched up later.
  assert_eq!(store.load().unwrap(), (Some(token.clone()), items.to_vec()));
  assert_eq!(repo.load_items(&token).unwrap().len(), 2);
  assert_eq!(provider.captures_attempted(), 1);
}

#[tokio::test]
#[serial]
async fn partially_created_bookings_are_reported() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, _) = seeded_store(&[live_item("1", "80.00", now)]);
  let provider = Arc::new(MockPaymentProvider::completing());
  let backend = Arc::new(RecordingBackend::failing(BackendError::Finalize {
    booking_ids: vec![BookingId::new("77")],
    source: Box::new(BackendError::Api {
      status: 500,
      message: "boom".to_string(),
    }),
  }));
  let checkout = orchestrator(&store, &provider, &backend);

  match checkout.checkout(now).await {
    Err(CheckoutError::Reconciliation(e)) => assert_eq!(e.booking_ids, vec![BookingId::new("77")]),
    other => panic!("expected reconciliation, got {other:?}"),
  }
  assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn validation_failures_send_nothing() {
  setup_tracing();
  let now = Utc::now();
  let stale = cart_item("old", "50.00", now - Duration::minutes(1));
  let mut no_email = live_item("2", "60.00", now);
  no_email.email.clear();

  let cases = [
    (Vec::new(), ValidationError::EmptyCart),
    (
      vec![stale, live_item("1", "40.00", now)],
      ValidationError::ExpiredItems {
        item_ids: vec![CartItemId::new("old")],
      },
    ),
    (
      vec![no_email],
      ValidationError::IncompleteCustomerInfo {
        item_ids: vec![CartItemId::new("2")],
      },
    ),
  ];

  for (items, expected) in cases {
    let (store, _, _) = seeded_store(&items);
    let provider = Arc::new(MockPaymentProvider::completing());
    let backend = Arc::new(RecordingBackend::confirming(&["1"]));
    let checkout = orchestrator(&store, &provider, &backend);

    match checkout.checkout(now).await {
      Err(CheckoutError::Validation(e)) => assert_eq!(e, expected),
      other => panic!("expected {expected:?}, got {other:?}"),
    }
    assert_eq!(checkout.state(), CheckoutState::Idle);
    assert_eq!(provider.orders_created(), 0);
    assert!(backend.requests().is_empty());
    assert_eq!(store.count().unwrap(), items.len());
  }
}

#[tokio::test]
#[serial]
async fn empty_store_without_token_is_an_empty_cart() {
  setup_tracing();
  let (store, _) = memory_store();
  let provider = Arc::new(MockPaymentProvider::completing());
  let backend = Arc::new(RecordingBackend::confirming(&[]));
  let checkout = orchestrator(&store, &provider, &backend);

  let err = checkout.checkout(Utc::now()).await.unwrap_err();
  assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));
}

#[tokio::test]
#[serial]
async fn provider_failure_returns_to_idle_and_keeps_the_cart() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, token) = seeded_store(&[live_item("1", "100.00", now)]);
  let provider = Arc::new(MockPaymentProvider::new(MockCaptureBehavior::Decline(
    "INSTRUMENT_DECLINED".to_string(),
  )));
  let backend = Arc::new(RecordingBackend::confirming(&["1"]));
  let checkout = orchestrator(&store, &provider, &backend);

  let err = checkout.checkout(now).await.unwrap_err();
  assert!(matches!(err, CheckoutError::Provider(ProviderError::Declined(_))));
  assert_eq!(checkout.state(), CheckoutState::Idle);
  assert!(backend.requests().is_empty());
  assert_eq!(store.load().unwrap().0, Some(token));

  // The buyer may simply try again.
  provider.set_behavior(MockCaptureBehavior::Cancel);
  let err = checkout.checkout(now).await.unwrap_err();
  assert!(matches!(err, CheckoutError::Provider(ProviderError::Cancelled)));

  provider.set_behavior(MockCaptureBehavior::Complete);
  checkout.checkout(now).await.unwrap();
  assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
#[serial]
async fn concurrent_submission_is_rejected() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, _) = seeded_store(&[live_item("1", "100.00", now)]);
  let provider = Arc::new(MockPaymentProvider::completing().with_latency(StdDuration::from_millis(200)));
  let backend = Arc::new(RecordingBackend::confirming(&["9"]));
  let checkout = orchestrator(&store, &provider, &backend);

  let first = {
    let checkout = checkout.clone();
    tokio::spawn(async move { checkout.checkout(now).await })
  };
  tokio::time::sleep(StdDuration::from_millis(50)).await;
  assert!(checkout.state().is_in_flight());

  let second = checkout.checkout(now).await.unwrap_err();
  assert!(matches!(second, CheckoutError::AttemptInProgress(_)));
  assert!(checkout.reset().is_err());

  first.await.unwrap().unwrap();
  assert_eq!(provider.orders_created(), 1);
  assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
#[serial]
async fn items_added_during_checkout_survive_it() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, token) = seeded_store(&[live_item("1", "100.00", now)]);
  let provider = Arc::new(MockPaymentProvider::completing().with_latency(StdDuration::from_millis(100)));
  let backend = Arc::new(RecordingBackend::confirming(&["9"]));
  let checkout = orchestrator(&store, &provider, &backend);

  let attempt = {
    let checkout = checkout.clone();
    tokio::spawn(async move { checkout.checkout(now).await })
  };
  tokio::time::sleep(StdDuration::from_millis(30)).await;
  store.add_item(live_item("2", "50.00", now)).unwrap();

  let receipt = attempt.await.unwrap().unwrap();
  assert_eq!(receipt.amount.value, "100.00");
  assert!(!receipt.cart_cleared);
  let paid: Vec<_> = backend.requests()[0].cart_items.iter().map(|item| item.id.clone()).collect();
  assert_eq!(paid, [CartItemId::new("1")]);

  let (left_token, left) = store.load().unwrap();
  assert_eq!(left_token, Some(token));
  assert_eq!(left.len(), 1);
  assert_eq!(left[0].id, CartItemId::new("2"));
}

#[tokio::test]
#[serial]
async fn resting_state_must_be_reset_before_resubmitting() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, _) = seeded_store(&[live_item("1", "100.00", now)]);
  let provider = Arc::new(MockPaymentProvider::completing());
  let backend = Arc::new(RecordingBackend::failing(BackendError::Api {
    status: 502,
    message: "bad gateway".to_string(),
  }));
  let checkout = orchestrator(&store, &provider, &backend);

  assert!(checkout.checkout(now).await.is_err());
  let err = checkout.checkout(now).await.unwrap_err();
  assert!(matches!(
    err,
    CheckoutError::AttemptUnresolved(CheckoutState::ReconciliationNeeded { .. })
  ));
  assert_eq!(provider.captures_attempted(), 1);

  checkout.reset().unwrap();
  assert_eq!(checkout.state(), CheckoutState::Idle);
}

#[tokio::test]
#[serial]
async fn dropping_the_caller_does_not_cancel_after_capture() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, _) = seeded_store(&[live_item("1", "100.00", now)]);
  let provider = Arc::new(MockPaymentProvider::completing().with_latency(StdDuration::from_millis(100)));
  let backend = Arc::new(RecordingBackend::confirming(&["3"]));
  let checkout = orchestrator(&store, &provider, &backend);

  let abandoned = tokio::time::timeout(StdDuration::from_millis(20), checkout.checkout(now)).await;
  assert!(abandoned.is_err());

  for _ in 0..100 {
    if !checkout.state().is_in_flight() {
      break;
    }
    tokio::time::sleep(StdDuration::from_millis(20)).await;
  }
  assert_eq!(
    checkout.state(),
    CheckoutState::Success {
      booking_ids: vec![BookingId::new("3")]
    }
  );
  assert_eq!(backend.requests().len(), 1);
  assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn failed_cart_clear_still_counts_as_success() {
  setup_tracing();
  let now = Utc::now();
  let store = CartStore::new(Arc::new(StuckRepository::default()), CartEvents::new());
  store.add_item(live_item("1", "100.00", now)).unwrap();
  let provider = Arc::new(MockPaymentProvider::completing());
  let backend = Arc::new(RecordingBackend::confirming(&["4"]));
  let checkout = orchestrator(&store, &provider, &backend);

  let receipt = checkout.checkout(now).await.unwrap();
  assert!(!receipt.cart_cleared);
  assert!(matches!(checkout.state(), CheckoutState::Success { .. }));
}
