// rentcart/src/checkout/validate.rs
use crate::error::ValidationError;
use crate::expiry::expired_items;
use crate::model::{CartItem, CartItemId};
use chrono::{DateTime, Utc};

/// Checks that `items` may be submitted at `now`.
///
/// The first failing rule wins: empty cart, then elapsed holds, then missing
/// contact details.
pub fn validate(items: &[CartItem], now: DateTime<Utc>) -> Result<(), ValidationError> {
  if items.is_empty() {
    return Err(ValidationError::EmptyCart);
  }

  let expired: Vec<CartItemId> = expired_items(items, now).map(|item| item.id.clone()).collect();
  if !expired.is_empty() {
    return Err(ValidationError::ExpiredItems { item_ids: expired });
  }

  let incomplete: Vec<CartItemId> = items
    .iter()
    .filter(|item| !item.has_customer_info())
    .map(|item| item.id.clone())
    .collect();
  if !incomplete.is_empty() {
    return Err(ValidationError::IncompleteCustomerInfo { item_ids: incomplete });
  }

  Ok(())
}
