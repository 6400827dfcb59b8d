// rentcart/src/backend/http.rs
use crate::backend::{BookingBackend, ConfirmPaymentRequest, ConfirmPaymentResponse};
use crate::error::BackendError;
use crate::model::{BookingId, CartItem, CartToken};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Which backend call shape confirms a paid cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendContract {
  /// `POST /cart/confirm-payment` with the cart and the capture in one call.
  #[default]
  ConfirmPayment,
  /// `POST /cart/checkout` creates the bookings, then
  /// `PATCH /cart/paypal-complete` marks them paid.
  CheckoutThenComplete,
}

#[derive(Debug, Serialize)]
struct CheckoutBody<'a> {
  cart_token: &'a CartToken,
  cart_items: &'a [CartItem],
}

#[derive(Debug, Serialize)]
struct PaypalCompleteBody<'a> {
  cart_token: &'a CartToken,
  booking_ids: &'a [BookingId],
  paypal_details: &'a serde_json::Value,
}

/// `BookingBackend` over the rental REST API.
#[derive(Debug, Clone)]
pub struct HttpBookingBackend {
  client: Client,
  base_url: String,
  auth_token: Option<String>,
  contract: BackendContract,
}

impl HttpBookingBackend {
  pub fn new(client: Client, base_url: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into(),
      auth_token: None,
      contract: BackendContract::default(),
    }
  }

  /// Sends `Authorization: Bearer <token>` on every call.
  pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
    self.auth_token = Some(token.into());
    self
  }

  pub fn with_contract(mut self, contract: BackendContract) -> Self {
    self.contract = contract;
    self
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
    match &self.auth_token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn send_for_bookings(&self, builder: RequestBuilder) -> Result<ConfirmPaymentResponse, BackendError> {
    let response = self
      .authorized(builder)
      .send()
      .await
      .map_err(|e| BackendError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(BackendError::Api {
        status: status.as_u16(),
        message,
      });
    }
    response
      .json::<ConfirmPaymentResponse>()
      .await
      .map_err(|e| BackendError::Parse(e.to_string()))
  }

  async fn confirm_in_one_call(&self, request: &ConfirmPaymentRequest) -> Result<ConfirmPaymentResponse, BackendError> {
    self
      .send_for_bookings(self.client.post(self.url("/cart/confirm-payment")).json(request))
      .await
  }

  async fn checkout_then_complete(&self, request: &ConfirmPaymentRequest) -> Result<ConfirmPaymentResponse, BackendError> {
    let created = self
      .send_for_bookings(self.client.post(self.url("/cart/checkout")).json(&CheckoutBody {
        cart_token: &request.cart_token,
        cart_items: &request.cart_items,
      }))
      .await?;
    info!(booking_ids = ?created.booking_ids, "Bookings created; marking them paid.");

    let complete = self.client.patch(self.url("/cart/paypal-complete")).json(&PaypalCompleteBody {
      cart_token: &request.cart_token,
      booking_ids: &created.booking_ids,
      paypal_details: &request.paypal_details,
    });
    let response = self
      .authorized(complete)
      .send()
      .await
      .map_err(|e| BackendError::Request(e.to_string()));

    let failure = match response {
      Ok(response) if response.status().is_success() => return Ok(created),
      Ok(response) => {
        let status = response.status().as_u16();
        BackendError::Api {
          status,
          message: response.text().await.unwrap_or_default(),
        }
      }
      Err(e) => e,
    };
    warn!(error = %failure, "Bookings created but paypal-complete failed.");
    Err(BackendError::Finalize {
      booking_ids: created.booking_ids,
      source: Box::new(failure),
    })
  }
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
  #[instrument(
    name = "HttpBookingBackend::confirm_payment",
    skip_all,
    fields(cart_token = %request.cart_token, items = request.cart_items.len(), contract = ?self.contract),
    err(Display)
  )]
  async fn confirm_payment(&self, request: &ConfirmPaymentRequest) -> Result<ConfirmPaymentResponse, BackendError> {
    match self.contract {
      BackendContract::ConfirmPayment => self.confirm_in_one_call(request).await,
      BackendContract::CheckoutThenComplete => self.checkout_then_complete(request).await,
    }
  }
}
