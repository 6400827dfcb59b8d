// rentcart/src/events.rs

//! The "cart changed" signal. Widgets that show cart state (a header badge,
//! an open cart view) subscribe and re-read the store when it fires.

use tokio::sync::broadcast;

/// Payload-free notification that the persisted cart changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartChanged;

/// Explicit subject handed to the `CartStore`; clones share one channel.
#[derive(Debug, Clone)]
pub struct CartEvents {
  sender: broadcast::Sender<CartChanged>,
}

impl CartEvents {
  pub fn new() -> Self {
    // Receivers only ever need the latest signal.
    let (sender, _) = broadcast::channel(16);
    Self { sender }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<CartChanged> {
    self.sender.subscribe()
  }

  pub(crate) fn notify(&self) {
    let receivers = self.sender.send(CartChanged).unwrap_or(0);
    tracing::trace!(receivers, "Cart changed signal sent.");
  }
}

impl Default for CartEvents {
  fn default() -> Self {
    Self::new()
  }
}
