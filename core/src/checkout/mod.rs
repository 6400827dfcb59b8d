// rentcart/src/checkout/mod.rs

//! Two-phase checkout: the provider captures funds first, then the rental
//! backend turns the capture into bookings. A failure between the two leaves
//! the attempt in `ReconciliationNeeded` with the cart untouched.

pub mod context;
pub mod orchestrator;
pub mod state;
pub mod steps;
pub mod validate;

pub use context::{CheckoutCtxData, CheckoutServices};
pub use orchestrator::{CheckoutOrchestrator, CheckoutReceipt};
pub use state::{CheckoutState, StateCell};
pub use validate::validate;
