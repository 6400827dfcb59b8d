// rentcart/src/expiry.rs

//! Reservation hold expiry. Expired items are never swept in the background;
//! they are filtered out when the cart is read (see `CartStore::load_live`).

use crate::model::CartItem;
use chrono::{DateTime, Utc};

/// Items whose hold is still running at `now`, in their original order.
/// An item without a readable `expires_at` is dropped.
pub fn live_items(items: &[CartItem], now: DateTime<Utc>) -> Vec<CartItem> {
  items.iter().filter(|item| item.is_live(now)).cloned().collect()
}

/// Items whose hold has elapsed at `now`.
pub fn expired_items(items: &[CartItem], now: DateTime<Utc>) -> impl Iterator<Item = &CartItem> {
  items.iter().filter(move |item| !item.is_live(now))
}
