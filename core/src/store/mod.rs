// rentcart/src/store/mod.rs

//! Durable cart persistence addressed by cart token.
//!
//! `CartRepository` is the storage seam (file-backed in the CLI, in-memory in
//! tests). `CartStore` layers the cart operations on top and fires
//! `CartChanged` after every mutation.

pub mod file;
pub mod memory;

pub use file::FileCartRepository;
pub use memory::MemoryCartRepository;

use crate::error::StoreResult;
use crate::events::CartEvents;
use crate::expiry::live_items;
use crate::model::{cart_total, CartItem, CartItemId, CartSession, CartToken};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Raw key-value storage of one token and, per token, one ordered item list.
pub trait CartRepository: Send + Sync {
  fn load_token(&self) -> StoreResult<Option<CartToken>>;

  /// Items stored for `token`; empty when nothing was ever saved for it.
  fn load_items(&self, token: &CartToken) -> StoreResult<Vec<CartItem>>;

  fn save_token(&self, token: &CartToken) -> StoreResult<()>;

  /// Overwrites the item list for `token`.
  fn save_items(&self, token: &CartToken, items: &[CartItem]) -> StoreResult<()>;

  /// Deletes the item list for `token` and the token itself.
  fn clear(&self, token: &CartToken) -> StoreResult<()>;
}

/// The cart operations the rest of the application uses.
#[derive(Clone)]
pub struct CartStore {
  repo: Arc<dyn CartRepository>,
  events: CartEvents,
}

impl CartStore {
  pub fn new(repo: Arc<dyn CartRepository>, events: CartEvents) -> Self {
    Self { repo, events }
  }

  pub fn events(&self) -> &CartEvents {
    &self.events
  }

  /// Reads the token, then the items stored for it. `(None, [])` when no
  /// cart exists.
  pub fn load(&self) -> StoreResult<(Option<CartToken>, Vec<CartItem>)> {
    match self.repo.load_token()? {
      Some(token) => {
        let items = self.repo.load_items(&token)?;
        Ok((Some(token), items))
      }
      None => Ok((None, Vec::new())),
    }
  }

  /// Overwrites the persisted items for `token` and makes it the current cart.
  #[instrument(name = "CartStore::save", skip_all, fields(%token, item_count = items.len()))]
  pub fn save(&self, token: &CartToken, items: &[CartItem]) -> StoreResult<()> {
    self.repo.save_token(token)?;
    self.repo.save_items(token, items)?;
    self.events.notify();
    Ok(())
  }

  /// Drops the item with `item_id` and returns the new cart total.
  /// Without a cart this does nothing and returns zero.
  #[instrument(name = "CartStore::remove_item", skip_all, fields(%item_id))]
  pub fn remove_item(&self, item_id: &CartItemId) -> StoreResult<Decimal> {
    let (token, items) = match self.load()? {
      (Some(token), items) => (token, items),
      (None, _) => {
        debug!("No cart token; nothing to remove.");
        return Ok(Decimal::ZERO);
      }
    };
    let remaining: Vec<CartItem> = items.into_iter().filter(|item| &item.id != item_id).collect();
    self.save(&token, &remaining)?;
    Ok(cart_total(&remaining))
  }

  /// Deletes the item list and the token.
  #[instrument(name = "CartStore::clear", skip(self))]
  pub fn clear(&self) -> StoreResult<()> {
    if let Some(token) = self.repo.load_token()? {
      self.repo.clear(&token)?;
      info!(%token, "Cart cleared.");
      self.events.notify();
    }
    Ok(())
  }

  /// Removes the items a finished checkout paid for and returns how many
  /// items are left. The token is cleared only once the cart is empty.
  /// Items added while the attempt ran stay. A different current token means
  /// the paid cart is already gone.
  #[instrument(name = "CartStore::remove_paid", skip(self, paid), fields(paid = paid.len()))]
  pub fn remove_paid(&self, token: &CartToken, paid: &[CartItemId]) -> StoreResult<usize> {
    let (current, items) = self.load()?;
    if current.as_ref() != Some(token) {
      debug!(%token, "Paid cart no longer current; nothing to remove.");
      return Ok(items.len());
    }
    let remaining: Vec<CartItem> = items.into_iter().filter(|item| !paid.contains(&item.id)).collect();
    if remaining.is_empty() {
      self.repo.clear(token)?;
      info!(%token, "Cart cleared.");
      self.events.notify();
    } else {
      warn!(%token, left = remaining.len(), "Items added during checkout were kept.");
      self.save(token, &remaining)?;
    }
    Ok(remaining.len())
  }

  /// Adds `item`, starting a new cart session if none exists. An item with
  /// the same id is replaced in place.
  #[instrument(name = "CartStore::add_item", skip(self, item), fields(item_id = %item.id))]
  pub fn add_item(&self, item: CartItem) -> StoreResult<CartToken> {
    let (token, mut items) = match self.load()? {
      (Some(token), items) => (token, items),
      (None, _) => {
        let token = CartToken::generate();
        info!(%token, "Starting a new cart session.");
        (token, Vec::new())
      }
    };
    match items.iter_mut().find(|existing| existing.id == item.id) {
      Some(existing) => *existing = item,
      None => items.push(item),
    }
    self.save(&token, &items)?;
    Ok(token)
  }

  /// Edits one stored item in place. Returns `false` if it does not exist.
  pub fn update_item(&self, item_id: &CartItemId, edit: impl FnOnce(&mut CartItem)) -> StoreResult<bool> {
    let (Some(token), mut items) = self.load()? else {
      return Ok(false);
    };
    let Some(item) = items.iter_mut().find(|item| &item.id == item_id) else {
      return Ok(false);
    };
    edit(item);
    self.save(&token, &items)?;
    Ok(true)
  }

  /// Number of stored items, expired or not.
  pub fn count(&self) -> StoreResult<usize> {
    Ok(self.load()?.1.len())
  }

  /// Loads the cart and drops items whose hold elapsed at `now`. When
  /// anything was dropped the pruned list is written back.
  #[instrument(name = "CartStore::load_live", skip(self))]
  pub fn load_live(&self, now: DateTime<Utc>) -> StoreResult<Option<CartSession>> {
    let (Some(token), items) = self.load()? else {
      return Ok(None);
    };
    let stored = items.len();
    let live = live_items(&items, now);
    if live.len() != stored {
      info!(%token, pruned = stored - live.len(), "Pruning expired cart items.");
      self.save(&token, &live)?;
    }
    Ok(Some(CartSession { token, items: live }))
  }
}
