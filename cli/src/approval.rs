// rentcart-cli/src/approval.rs
use async_trait::async_trait;
use rentcart::{BuyerApproval, ProviderError, ProviderOrder};
use std::io::{self, BufRead, Write};

/// Prints the PayPal approval link and waits for the buyer to confirm on
/// stdin.
#[derive(Debug, Default)]
pub struct TerminalApproval;

#[async_trait]
impl BuyerApproval for TerminalApproval {
  async fn await_approval(&self, order: &ProviderOrder) -> Result<(), ProviderError> {
    let prompt = match &order.approve_url {
      Some(url) => format!(
        "Approve {} {} at:\n  {url}\nPress Enter once approved, or type 'cancel': ",
        order.amount.currency_code, order.amount.value
      ),
      None => format!(
        "Pay {} {}? Press Enter to continue, or type 'cancel': ",
        order.amount.currency_code, order.amount.value
      ),
    };

    let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
      let mut stdout = io::stdout();
      stdout.write_all(prompt.as_bytes())?;
      stdout.flush()?;
      let mut line = String::new();
      io::stdin().lock().read_line(&mut line)?;
      Ok(line)
    })
    .await
    .map_err(|e| ProviderError::Request(e.to_string()))?
    .map_err(|e| ProviderError::Request(e.to_string()))?;

    if answer.trim().eq_ignore_ascii_case("cancel") {
      return Err(ProviderError::Cancelled);
    }
    Ok(())
  }
}
