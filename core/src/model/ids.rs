// rentcart/src/model/ids.rs

//! Identifier newtypes. Producers elsewhere in the platform hand out both
//! numeric and string ids, so every id deserializes from either.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

struct LenientIdVisitor;

impl<'de> Visitor<'de> for LenientIdVisitor {
  type Value = String;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("a string or integer identifier")
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
    Ok(v.to_string())
  }

  fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
    Ok(v)
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
    Ok(v.to_string())
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
    Ok(v.to_string())
  }
}

macro_rules! lenient_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
    #[serde(transparent)]
    pub struct $name(String);

    impl $name {
      pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
      }

      pub fn as_str(&self) -> &str {
        &self.0
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<&str> for $name {
      fn from(s: &str) -> Self {
        Self(s.to_string())
      }
    }

    impl<'de> Deserialize<'de> for $name {
      fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientIdVisitor).map(Self)
      }
    }
  };
}

lenient_id!(
  /// Identifies a line item within one cart.
  CartItemId
);

lenient_id!(
  /// A booking created by the rental backend.
  BookingId
);

/// Opaque token tying a local cart to backend checkout calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(String);

impl CartToken {
  pub fn generate() -> Self {
    Self(Uuid::new_v4().to_string())
  }

  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CartToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
