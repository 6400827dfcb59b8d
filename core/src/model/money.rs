// rentcart/src/model/money.rs

use crate::model::cart_item::CartItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sum of the stored `total_price` of every item. Never re-derived from
/// base price or CDW.
pub fn cart_total(items: &[CartItem]) -> Decimal {
  items.iter().map(|item| item.total_price).sum()
}

/// Renders an amount with exactly two decimals, e.g. `249.50`.
pub fn format_amount(amount: Decimal) -> String {
  format!("{:.2}", amount.round_dp(2))
}

/// Renders an amount for display, e.g. `RM 249.50`.
pub fn format_display(currency_symbol: &str, amount: Decimal) -> String {
  format!("{} {}", currency_symbol, format_amount(amount))
}

/// The amount a payment provider is asked to authorize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAmount {
  pub currency_code: String,
  /// Two-decimal string, as payment APIs expect.
  pub value: String,
}

impl PaymentAmount {
  pub fn for_items(items: &[CartItem], currency_code: &str) -> Self {
    Self {
      currency_code: currency_code.to_string(),
      value: format_amount(cart_total(items)),
    }
  }
}
