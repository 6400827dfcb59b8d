// rentcart-cli/src/state.rs
use crate::approval::TerminalApproval;
use crate::config::AppConfig;
use crate::errors::{ConfigError, Result};
use rentcart::{
  CartEvents, CartPresenter, CartStore, CheckoutOrchestrator, FileCartRepository, HttpBookingBackend,
  MockPaymentProvider, PaymentProvider, PaypalProvider,
};
use std::sync::Arc;

/// Which payment provider `checkout` talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderChoice {
  Paypal,
  Mock,
}

/// Everything a command needs, wired from `AppConfig`.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub store: CartStore,
}

impl AppState {
  pub fn new(config: AppConfig) -> Result<Self> {
    let repo = FileCartRepository::open(&config.storage_dir)?;
    let store = CartStore::new(Arc::new(repo), CartEvents::new());
    Ok(Self {
      config: Arc::new(config),
      store,
    })
  }

  pub fn presenter(&self, provider: ProviderChoice) -> Result<CartPresenter> {
    let client = reqwest::Client::builder().timeout(self.config.http_timeout).build()?;

    let mut backend =
      HttpBookingBackend::new(client.clone(), self.config.api_base_url.clone()).with_contract(self.config.backend_contract);
    if let Some(token) = &self.config.api_token {
      backend = backend.with_auth_token(token.clone());
    }

    let provider: Arc<dyn PaymentProvider> = match provider {
      ProviderChoice::Mock => Arc::new(MockPaymentProvider::completing()),
      ProviderChoice::Paypal => {
        let paypal = self
          .config
          .paypal
          .clone()
          .ok_or(ConfigError::Missing("PAYPAL_CLIENT_ID/PAYPAL_CLIENT_SECRET"))?;
        Arc::new(PaypalProvider::new(client, paypal, Arc::new(TerminalApproval)))
      }
    };

    let orchestrator =
      CheckoutOrchestrator::new(self.store.clone(), provider, Arc::new(backend), self.config.currency_code.clone())?;
    Ok(CartPresenter::new(
      self.store.clone(),
      orchestrator,
      self.config.currency_symbol.clone(),
    ))
  }
}
