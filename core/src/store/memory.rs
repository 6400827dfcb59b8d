// rentcart/src/store/memory.rs
use crate::error::StoreResult;
use crate::model::{CartItem, CartToken};
use crate::store::CartRepository;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct MemoryState {
  token: Option<CartToken>,
  items: HashMap<CartToken, Vec<CartItem>>,
}

/// Process-local repository. Used in tests and wherever durability is not
/// wanted.
#[derive(Debug, Default)]
pub struct MemoryCartRepository {
  state: RwLock<MemoryState>,
}

impl MemoryCartRepository {
  pub fn new() -> Self {
    Self::default()
  }

  /// Tokens that currently have an item list.
  pub fn stored_tokens(&self) -> Vec<CartToken> {
    self.state.read().items.keys().cloned().collect()
  }
}

impl CartRepository for MemoryCartRepository {
  fn load_token(&self) -> StoreResult<Option<CartToken>> {
    Ok(self.state.read().token.clone())
  }

  fn load_items(&self, token: &CartToken) -> StoreResult<Vec<CartItem>> {
    Ok(self.state.read().items.get(token).cloned().unwrap_or_default())
  }

  fn save_token(&self, token: &CartToken) -> StoreResult<()> {
    self.state.write().token = Some(token.clone());
    Ok(())
  }

  fn save_items(&self, token: &CartToken, items: &[CartItem]) -> StoreResult<()> {
    self.state.write().items.insert(token.clone(), items.to_vec());
    Ok(())
  }

  fn clear(&self, token: &CartToken) -> StoreResult<()> {
    let mut state = self.state.write();
    state.items.remove(token);
    if state.token.as_ref() == Some(token) {
      state.token = None;
    }
    Ok(())
  }
}
