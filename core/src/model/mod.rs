// rentcart/src/model/mod.rs

//! Cart data as persisted locally and as sent to the rental backend.

pub mod cart_item;
pub mod ids;
pub mod money;

pub use cart_item::{CartItem, RateType};
pub use ids::{BookingId, CartItemId, CartToken};
pub use money::{cart_total, format_amount, format_display, PaymentAmount};

/// A cart instance: its token and its items in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSession {
  pub token: CartToken,
  pub items: Vec<CartItem>,
}
