// src/lib.rs

//! rentcart: client-side cart handling for vehicle rental bookings.
//!
//!  - A persistent cart keyed by an opaque cart token (`store`).
//!  - Reservation holds that lapse and are pruned on read (`expiry`).
//!  - Two-phase checkout: the payment provider captures, then the rental
//!    backend confirms the bookings (`checkout`). A backend failure after
//!    capture is surfaced as `ReconciliationNeeded`, never silently dropped.
//!  - A display model for the cart page (`view`).
//!
//! The checkout attempt runs on a small async step engine (`pipeline`).

pub mod backend;
pub mod checkout;
pub mod error;
pub mod events;
pub mod expiry;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod store;
pub mod view;

// --- Re-exports for the Public API ---

pub use crate::backend::{BackendContract, BookingBackend, ConfirmPaymentRequest, ConfirmPaymentResponse, HttpBookingBackend};
pub use crate::checkout::{validate, CheckoutOrchestrator, CheckoutReceipt, CheckoutState};
pub use crate::error::{
  BackendError, CheckoutError, ProviderError, ReconciliationError, StoreError, StoreResult, ValidationError,
};
pub use crate::events::{CartChanged, CartEvents};
pub use crate::expiry::live_items;
pub use crate::model::{BookingId, CartItem, CartItemId, CartSession, CartToken, PaymentAmount, RateType};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineOutcome};
pub use crate::provider::{
  BuyerApproval, MockCaptureBehavior, MockPaymentProvider, PaymentCapture, PaymentProvider, PaypalConfig,
  PaypalProvider, PreApproved, ProviderOrder,
};
pub use crate::store::{CartRepository, CartStore, FileCartRepository, MemoryCartRepository};
pub use crate::view::{CartPresenter, CartRow, CartView, Toast, ToastLevel};
