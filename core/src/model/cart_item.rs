// rentcart/src/model/cart_item.rs

use crate::model::ids::CartItemId;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Pricing plan the item was quoted under. Only drives a display label; any
/// discount is already folded into `total_price` by whoever added the item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateType {
  Weekly,
  Monthly,
  /// Also what any unrecognised rate type reads as.
  #[default]
  #[serde(other)]
  Daily,
}

impl RateType {
  pub fn discount_label(self) -> Option<&'static str> {
    match self {
      RateType::Daily => None,
      RateType::Weekly => Some("Weekly rate discount applied"),
      RateType::Monthly => Some("Monthly rate discount applied"),
    }
  }
}

/// One vehicle reservation held in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  pub id: CartItemId,

  pub vehicle: String,
  pub brand: String,
  #[serde(default)]
  pub seats: u32,
  #[serde(default)]
  pub transmission: String,

  pub pickup_date: String,
  pub pickup_time: String,
  pub return_date: String,
  pub return_time: String,
  pub pickup_location: String,
  pub total_days: u32,

  #[serde(with = "rust_decimal::serde::float")]
  pub base_price: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub cdw_total: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub total_price: Decimal,
  #[serde(default)]
  pub rate_type: RateType,

  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub driving_license: String,

  /// End of the reservation hold. `None` when the stored value was missing
  /// or unreadable; such an item counts as expired.
  #[serde(default, deserialize_with = "lenient_timestamp")]
  pub expires_at: Option<DateTime<Utc>>,
}

impl CartItem {
  /// True while the reservation hold is still running at `now`.
  pub fn is_live(&self, now: DateTime<Utc>) -> bool {
    matches!(self.expires_at, Some(expires_at) if expires_at > now)
  }

  /// True when every contact field checkout requires is filled in.
  pub fn has_customer_info(&self) -> bool {
    [&self.first_name, &self.last_name, &self.email, &self.phone]
      .iter()
      .all(|field| !field.trim().is_empty())
  }
}

/// Accepts RFC 3339 strings and epoch milliseconds; anything else becomes
/// `None` rather than failing the whole cart.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = serde_json::Value::deserialize(deserializer)?;
  let parsed = match &raw {
    serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc)),
    serde_json::Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().map(|f| f as i64))
      .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
    _ => None,
  };
  if parsed.is_none() && !raw.is_null() {
    tracing::warn!(value = %raw, "Unreadable expires_at on cart item; treating it as expired.");
  }
  Ok(parsed)
}
