// rentcart/src/checkout/orchestrator.rs
use crate::backend::BookingBackend;
use crate::checkout::context::{CheckoutCtxData, CheckoutServices};
use crate::checkout::state::{CheckoutState, StateCell};
use crate::checkout::steps::build_checkout_pipeline;
use crate::error::CheckoutError;
use crate::model::{BookingId, CartToken, PaymentAmount};
use crate::pipeline::{ContextData, Pipeline, PipelineError, PipelineOutcome};
use crate::provider::{PaymentCapture, PaymentProvider};
use crate::store::CartStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
  pub cart_token: CartToken,
  pub booking_ids: Vec<BookingId>,
  pub amount: PaymentAmount,
  pub capture: PaymentCapture,
  /// False when the local cart still holds something afterwards: items added
  /// while the attempt ran, or paid items that could not be removed.
  pub cart_cleared: bool,
}

/// Runs checkout attempts against one cart store and owns their state.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
  pipeline: Arc<Pipeline<CheckoutCtxData, CheckoutError>>,
  services: Arc<CheckoutServices>,
}

impl CheckoutOrchestrator {
  pub fn new(
    store: CartStore,
    provider: Arc<dyn PaymentProvider>,
    backend: Arc<dyn BookingBackend>,
    currency_code: impl Into<String>,
  ) -> Result<Self, PipelineError> {
    Ok(Self {
      pipeline: Arc::new(build_checkout_pipeline()?),
      services: Arc::new(CheckoutServices {
        store,
        provider,
        backend,
        state: StateCell::new(),
        currency_code: currency_code.into(),
      }),
    })
  }

  pub fn state(&self) -> CheckoutState {
    self.services.state.get()
  }

  /// Returns a finished attempt (`Success`, `ReconciliationNeeded`) to `Idle`.
  pub fn reset(&self) -> Result<(), CheckoutError> {
    self.services.state.reset()
  }

  /// Submits the stored cart.
  ///
  /// Only one attempt runs at a time: unless the state is `Idle` this returns
  /// `AttemptInProgress` or `AttemptUnresolved` without side effects. The
  /// attempt itself runs on its own task, so dropping the returned future
  /// does not stop a capture from reaching the backend.
  #[instrument(name = "CheckoutOrchestrator::checkout", skip(self), err(Display))]
  pub async fn checkout(&self, now: DateTime<Utc>) -> Result<CheckoutReceipt, CheckoutError> {
    self.services.state.begin()?;

    let ctx = ContextData::new(CheckoutCtxData::new(self.services.clone(), now));
    let pipeline = self.pipeline.clone();
    let state = self.services.state.clone();
    let task_ctx = ctx.clone();
    let attempt = tokio::spawn(async move {
      let outcome = pipeline.run(task_ctx.clone()).await;
      settle(&state, &task_ctx, outcome)
    });

    match attempt.await {
      Ok(result) => result,
      Err(join_error) => {
        error!(error = %join_error, "Checkout attempt task failed.");
        let reason = format!("checkout task failed: {join_error}");
        fall_back(&self.services.state, &ctx, &reason);
        Err(CheckoutError::Internal(reason))
      }
    }
  }
}

/// Moves the state machine to its resting point for `outcome`.
fn settle(
  state: &StateCell,
  ctx: &ContextData<CheckoutCtxData>,
  outcome: Result<PipelineOutcome, CheckoutError>,
) -> Result<CheckoutReceipt, CheckoutError> {
  match outcome {
    Ok(PipelineOutcome::Completed) => {
      let receipt = receipt_from(ctx);
      match &receipt {
        Ok(receipt) => {
          info!(booking_ids = ?receipt.booking_ids, capture_id = %receipt.capture.capture_id, "Checkout succeeded.");
          state.set(CheckoutState::Success {
            booking_ids: receipt.booking_ids.clone(),
          });
        }
        Err(e) => fall_back(state, ctx, &e.to_string()),
      }
      receipt
    }
    Ok(PipelineOutcome::Stopped) => {
      let reason = "checkout stopped before completion";
      fall_back(state, ctx, reason);
      Err(CheckoutError::Internal(reason.to_string()))
    }
    Err(CheckoutError::Reconciliation(e)) => {
      state.set(CheckoutState::ReconciliationNeeded {
        capture_id: e.capture.capture_id.clone(),
        reason: e.source.to_string(),
      });
      Err(CheckoutError::Reconciliation(e))
    }
    Err(e) => {
      fall_back(state, ctx, &e.to_string());
      Err(e)
    }
  }
}

/// `Idle` if no money moved during the attempt, `ReconciliationNeeded`
/// otherwise.
fn fall_back(state: &StateCell, ctx: &ContextData<CheckoutCtxData>, reason: &str) {
  let captured = ctx.read().capture.as_ref().map(|capture| capture.capture_id.clone());
  match captured {
    Some(capture_id) => {
      error!(%capture_id, %reason, "Attempt failed after capture.");
      state.set(CheckoutState::ReconciliationNeeded {
        capture_id,
        reason: reason.to_string(),
      });
    }
    None => {
      warn!(%reason, "Checkout attempt abandoned; nothing was charged.");
      state.set(CheckoutState::Idle);
    }
  }
}

fn receipt_from(ctx: &ContextData<CheckoutCtxData>) -> Result<CheckoutReceipt, CheckoutError> {
  let data = ctx.read();
  let incomplete = |what: &str| CheckoutError::Internal(format!("completed attempt has no {what}"));
  Ok(CheckoutReceipt {
    cart_token: data.cart_token.clone().ok_or_else(|| incomplete("cart token"))?,
    booking_ids: data.booking_ids.clone(),
    amount: data.amount.clone().ok_or_else(|| incomplete("amount"))?,
    capture: data.capture.clone().ok_or_else(|| incomplete("capture"))?,
    cart_cleared: data.cart_cleared,
  })
}
