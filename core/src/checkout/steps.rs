// rentcart/src/checkout/steps.rs

//! The checkout attempt as a step pipeline.
//!
//! State transitions ride on `before` handlers so the state always names the
//! step that is about to talk to the outside world.

use crate::backend::ConfirmPaymentRequest;
use crate::checkout::context::CheckoutCtxData;
use crate::checkout::state::CheckoutState;
use crate::checkout::validate::validate;
use crate::error::{CheckoutError, ReconciliationError, ValidationError};
use crate::model::PaymentAmount;
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError};
use tracing::{error, info, warn};

pub const LOAD_CART: &str = "load_cart";
pub const VALIDATE_CART: &str = "validate_cart";
pub const CREATE_PROVIDER_ORDER: &str = "create_provider_order";
pub const CAPTURE_PAYMENT: &str = "capture_payment";
pub const CONFIRM_WITH_BACKEND: &str = "confirm_with_backend";
pub const CLEAR_CART: &str = "clear_cart";

fn missing(what: &str) -> CheckoutError {
  PipelineError::Internal(format!("{what} was not set by an earlier step")).into()
}

pub(crate) fn build_checkout_pipeline() -> Result<Pipeline<CheckoutCtxData, CheckoutError>, PipelineError> {
  let mut p = Pipeline::<CheckoutCtxData, CheckoutError>::new(&[
    (LOAD_CART, false),
    (VALIDATE_CART, false),
    (CREATE_PROVIDER_ORDER, false),
    (CAPTURE_PAYMENT, false),
    (CONFIRM_WITH_BACKEND, false),
    (CLEAR_CART, false),
  ])?;

  p.on_root(LOAD_CART, |ctx: ContextData<CheckoutCtxData>| async move {
    let store = ctx.read().services.store.clone();
    let (cart_token, items) = store.load()?;
    info!(cart_token = ?cart_token, item_count = items.len(), "Cart loaded for checkout.");
    {
      let mut guard = ctx.write();
      guard.cart_token = cart_token;
      guard.items = items;
    }
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  })?;

  p.on_root(VALIDATE_CART, |ctx: ContextData<CheckoutCtxData>| async move {
    let mut guard = ctx.write();
    if let Err(e) = validate(&guard.items, guard.now) {
      warn!(error = %e, "Cart rejected before payment.");
      return Err(e);
    }
    let amount = PaymentAmount::for_items(&guard.items, &guard.services.currency_code);
    info!(value = %amount.value, currency = %amount.currency_code, "Cart validated.");
    guard.amount = Some(amount);
    Ok::<_, ValidationError>(PipelineControl::Continue)
  })?;

  p.before_root(CREATE_PROVIDER_ORDER, |ctx: ContextData<CheckoutCtxData>| async move {
    ctx.read().services.state.set(CheckoutState::AwaitingProviderCapture);
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  })?;

  p.on_root(CREATE_PROVIDER_ORDER, |ctx: ContextData<CheckoutCtxData>| async move {
    let (provider, amount) = {
      let guard = ctx.read();
      (guard.services.provider.clone(), guard.amount.clone())
    };
    let amount = amount.ok_or_else(|| missing("payment amount"))?;
    let order = provider.create_order(&amount).await?;
    ctx.write().provider_order = Some(order);
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  })?;

  p.on_root(CAPTURE_PAYMENT, |ctx: ContextData<CheckoutCtxData>| async move {
    let (provider, order) = {
      let guard = ctx.read();
      (guard.services.provider.clone(), guard.provider_order.clone())
    };
    let order = order.ok_or_else(|| missing("provider order"))?;
    let capture = provider.capture(&order).await?;
    info!(order_id = %capture.order_id, capture_id = %capture.capture_id, "Payment captured.");
    ctx.write().capture = Some(capture);
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  })?;

  p.before_root(CONFIRM_WITH_BACKEND, |ctx: ContextData<CheckoutCtxData>| async move {
    ctx.read().services.state.set(CheckoutState::ConfirmingWithBackend);
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  })?;

  p.on_root(CONFIRM_WITH_BACKEND, |ctx: ContextData<CheckoutCtxData>| async move {
    let (backend, request, capture) = {
      let guard = ctx.read();
      let capture = guard.capture.clone().ok_or_else(|| missing("payment capture"))?;
      let cart_token = guard.cart_token.clone().ok_or_else(|| missing("cart token"))?;
      let request = ConfirmPaymentRequest {
        cart_token,
        cart_items: guard.items.clone(),
        paypal_details: capture.details.clone(),
      };
      (guard.services.backend.clone(), request, capture)
    };

    match backend.confirm_payment(&request).await {
      Ok(response) => {
        info!(booking_ids = ?response.booking_ids, "Backend confirmed the bookings.");
        ctx.write().booking_ids = response.booking_ids;
      }
      Err(source) => {
        error!(capture_id = %capture.capture_id, error = %source, "Backend confirmation failed after capture.");
        return Err(
          ReconciliationError {
            booking_ids: source.created_booking_ids().to_vec(),
            capture,
            source,
          }
          .into(),
        );
      }
    }
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  })?;

  p.on_root(CLEAR_CART, |ctx: ContextData<CheckoutCtxData>| async move {
    let (store, token, paid) = {
      let guard = ctx.read();
      let token = guard.cart_token.clone().ok_or_else(|| missing("cart token"))?;
      let paid: Vec<_> = guard.items.iter().map(|item| item.id.clone()).collect();
      (guard.services.store.clone(), token, paid)
    };
    match store.remove_paid(&token, &paid) {
      Ok(left) => ctx.write().cart_cleared = left == 0,
      // Bookings stand either way.
      Err(e) => error!(error = %e, "Bookings confirmed but the paid items could not be removed."),
    }
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  })?;

  Ok(p)
}
