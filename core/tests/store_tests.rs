// tests/store_tests.rs
mod common;
use chrono::{Duration, Utc};
use common::*;
use rentcart::{CartChanged, CartEvents, CartItemId, CartRepository, CartStore, CartToken, FileCartRepository};
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn load_without_token_is_empty() {
  setup_tracing();
  let (store, _) = memory_store();
  assert_eq!(store.load().unwrap(), (None, Vec::new()));
  assert_eq!(store.count().unwrap(), 0);
}

#[test]
#[serial]
fn save_overwrites_the_list_for_a_token() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, token) = seeded_store(&[live_item("1", "10.00", now), live_item("2", "20.00", now)]);

  store.save(&token, &[live_item("3", "30.00", now)]).unwrap();
  let (loaded_token, items) = store.load().unwrap();
  assert_eq!(loaded_token, Some(token));
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].id, CartItemId::new("3"));
}

#[test]
#[serial]
fn remove_item_persists_and_returns_new_total() {
  setup_tracing();
  let now = Utc::now();
  let (store, repo, token) = seeded_store(&[live_item("1", "150.00", now), live_item("2", "99.50", now)]);

  let total = store.remove_item(&CartItemId::new("1")).unwrap();
  assert_eq!(total, money("99.50"));

  let persisted = repo.load_items(&token).unwrap();
  assert_eq!(persisted.len(), 1);
  assert_eq!(persisted[0].id, CartItemId::new("2"));
}

#[test]
#[serial]
fn remove_item_without_cart_is_a_no_op() {
  setup_tracing();
  let (store, repo) = memory_store();
  assert_eq!(store.remove_item(&CartItemId::new("1")).unwrap(), Decimal::ZERO);
  assert_eq!(repo.load_token().unwrap(), None);
  assert!(repo.stored_tokens().is_empty());
}

#[test]
#[serial]
fn clear_deletes_items_and_token_and_notifies() {
  setup_tracing();
  let now = Utc::now();
  let (store, repo, token) = seeded_store(&[live_item("1", "10.00", now)]);
  let mut changes = store.events().subscribe();

  store.clear().unwrap();
  assert_eq!(changes.try_recv(), Ok(CartChanged));
  assert_eq!(store.load().unwrap(), (None, Vec::new()));
  assert!(repo.load_items(&token).unwrap().is_empty());

  // Nothing left to clear, nothing to announce.
  store.clear().unwrap();
  assert!(changes.try_recv().is_err());
}

#[test]
#[serial]
fn remove_paid_keeps_unpaid_items_and_the_token() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, token) = seeded_store(&[live_item("1", "10.00", now), live_item("2", "20.00", now)]);

  let left = store.remove_paid(&token, &[CartItemId::new("1")]).unwrap();
  assert_eq!(left, 1);
  let (current, items) = store.load().unwrap();
  assert_eq!(current, Some(token.clone()));
  assert_eq!(items[0].id, CartItemId::new("2"));

  assert_eq!(store.remove_paid(&token, &[CartItemId::new("2")]).unwrap(), 0);
  assert_eq!(store.load().unwrap(), (None, Vec::new()));
}

#[test]
#[serial]
fn remove_paid_ignores_a_cart_that_replaced_the_paid_one() {
  setup_tracing();
  let now = Utc::now();
  let (store, _) = memory_store();
  let fresh = store.add_item(live_item("1", "10.00", now)).unwrap();

  let left = store.remove_paid(&CartToken::new("paid-earlier"), &[CartItemId::new("1")]).unwrap();
  assert_eq!(left, 1);
  assert_eq!(store.load().unwrap().0, Some(fresh));
}

#[test]
#[serial]
fn add_item_starts_a_session_and_replaces_same_id() {
  setup_tracing();
  let now = Utc::now();
  let (store, _) = memory_store();

  let token = store.add_item(live_item("1", "10.00", now)).unwrap();
  let again = store.add_item(live_item("2", "20.00", now)).unwrap();
  assert_eq!(token, again);

  store.add_item(live_item("1", "15.00", now)).unwrap();
  let (_, items) = store.load().unwrap();
  let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
  assert_eq!(ids, ["1", "2"]);
  assert_eq!(items[0].total_price, money("15.00"));
}

#[test]
#[serial]
fn update_item_edits_contact_details() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, _) = seeded_store(&[live_item("1", "10.00", now)]);

  let found = store
    .update_item(&CartItemId::new("1"), |item| item.email = "new@example.com".to_string())
    .unwrap();
  assert!(found);
  assert_eq!(store.load().unwrap().1[0].email, "new@example.com");

  assert!(!store.update_item(&CartItemId::new("404"), |_| {}).unwrap());
}

#[test]
#[serial]
fn every_save_is_announced() {
  setup_tracing();
  let now = Utc::now();
  let events = CartEvents::new();
  let mut changes = events.subscribe();
  let store = CartStore::new(Arc::new(rentcart::MemoryCartRepository::new()), events);

  store.add_item(live_item("1", "10.00", now)).unwrap();
  store.remove_item(&CartItemId::new("1")).unwrap();
  assert_eq!(changes.try_recv(), Ok(CartChanged));
  assert_eq!(changes.try_recv(), Ok(CartChanged));
}

#[test]
#[serial]
fn load_live_prunes_an_hour_old_hold_and_persists_it() {
  setup_tracing();
  let now = Utc::now();
  let stale = cart_item("old", "50.00", now - Duration::hours(1));
  let fresh = live_item("new", "75.00", now);
  let (store, repo, token) = seeded_store(&[stale, fresh]);

  let session = store.load_live(now).unwrap().unwrap();
  assert_eq!(session.token, token);
  assert_eq!(session.items.len(), 1);
  assert_eq!(session.items[0].id, CartItemId::new("new"));

  let persisted = repo.load_items(&token).unwrap();
  assert_eq!(persisted.len(), 1);
  assert_eq!(persisted[0].id, CartItemId::new("new"));
}

#[test]
#[serial]
fn load_live_without_expiries_does_not_write() {
  setup_tracing();
  let now = Utc::now();
  let (store, _, _) = seeded_store(&[live_item("1", "10.00", now)]);
  let mut changes = store.events().subscribe();

  store.load_live(now).unwrap();
  assert!(changes.try_recv().is_err());
  assert!(store.load_live(now).unwrap().is_some());
}

#[test]
#[serial]
fn file_repository_round_trips_a_cart() {
  setup_tracing();
  let now = Utc::now();
  let dir = tempfile::tempdir().unwrap();
  let repo = Arc::new(FileCartRepository::open(dir.path().join("cart")).unwrap());
  let store = CartStore::new(repo.clone(), CartEvents::new());

  let token = store.add_item(live_item("1", "149.50", now)).unwrap();
  assert!(repo.dir().join("cart_token").exists());
  assert!(repo.dir().join(format!("cart_items_{token}.json")).exists());

  let reopened = FileCartRepository::open(repo.dir()).unwrap();
  assert_eq!(reopened.load_token().unwrap(), Some(token.clone()));
  let items = reopened.load_items(&token).unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].total_price, money("149.50"));

  store.clear().unwrap();
  assert!(!repo.dir().join("cart_token").exists());
  assert!(!repo.dir().join(format!("cart_items_{token}.json")).exists());
}

#[test]
#[serial]
fn file_repository_reads_hand_written_carts() {
  setup_tracing();
  let now = Utc::now();
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join("cart_token"), "abc-1\n").unwrap();
  let raw = serde_json::json!([
    {
      "id": 1, "vehicle": "Bezza", "brand": "Perodua", "seats": 5, "transmission": "auto",
      "pickup_date": "2026-11-01", "pickup_time": "10:00", "return_date": "2026-11-02", "return_time": "10:00",
      "pickup_location": "Ipoh", "total_days": 1, "base_price": 90, "cdw_total": 10, "total_price": 100,
      "expires_at": "not a date"
    },
    {
      "id": "2", "vehicle": "Vios", "brand": "Toyota", "seats": 5, "transmission": "auto",
      "pickup_date": "2026-11-01", "pickup_time": "10:00", "return_date": "2026-11-02", "return_time": "10:00",
      "pickup_location": "Ipoh", "total_days": 1, "base_price": 120, "cdw_total": 0, "total_price": 120,
      "rate_type": "monthly", "expires_at": (now + Duration::minutes(20)).timestamp_millis()
    }
  ]);
  std::fs::write(dir.path().join("cart_items_abc-1.json"), raw.to_string()).unwrap();

  let store = CartStore::new(Arc::new(FileCartRepository::open(dir.path()).unwrap()), CartEvents::new());
  let session = store.load_live(now).unwrap().unwrap();
  assert_eq!(session.token, CartToken::new("abc-1"));
  assert_eq!(session.items.len(), 1);
  assert_eq!(session.items[0].id, CartItemId::new("2"));
}

#[test]
#[serial]
fn file_repository_refuses_path_like_tokens() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let repo = FileCartRepository::open(dir.path()).unwrap();
  assert!(repo.save_items(&CartToken::new("../escape"), &[]).is_err());
}
