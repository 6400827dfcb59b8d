// rentcart-cli/src/commands.rs
use crate::errors::{CliError, Result};
use crate::pending::{self, UnreconciledCapture};
use crate::state::{AppState, ProviderChoice};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use rentcart::{CartItem, CartItemId, CartView, CheckoutState, Toast};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Parser)]
#[command(name = "rentcart")]
#[command(about = "Manage a vehicle rental cart and check it out")]
#[command(version)]
pub struct Args {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
  /// Show the cart (expired holds are dropped)
  Show,
  /// Add item(s) from a JSON file holding one item or an array of items
  Add {
    file: PathBuf,
    /// Hold length for items that carry no `expires_at`
    #[arg(long, default_value_t = 15)]
    hold_minutes: i64,
  },
  /// Remove one item
  Remove { id: String },
  /// Empty the cart
  Clear,
  /// Set driver contact details on one item, or on every item
  Contact {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    driving_license: Option<String>,
    /// Only update this item
    #[arg(long)]
    id: Option<String>,
  },
  /// Pay for the cart and confirm the bookings
  Checkout {
    #[arg(long, value_enum, default_value = "paypal")]
    provider: ProviderChoice,
  },
  /// Forget an unreconciled capture once support has settled it
  Dismiss,
}

#[instrument(skip_all)]
pub async fn run(args: Args, state: AppState) -> Result<()> {
  let now = Utc::now();
  let symbol = state.config.currency_symbol.clone();

  let storage_dir = state.config.storage_dir.clone();

  match args.command {
    Commands::Show => {
      if let Some(capture) = pending::load(&storage_dir)? {
        eprintln!("Unreconciled capture {}: {}", capture.capture_id, capture.reason);
      }
      let items = state.store.load_live(now)?.map(|session| session.items).unwrap_or_default();
      print_view(&CartView::build(&items, &symbol));
    }
    Commands::Add { file, hold_minutes } => {
      for mut item in read_items(&file)? {
        if item.expires_at.is_none() {
          item.expires_at = Some(now + Duration::minutes(hold_minutes));
        }
        let id = item.id.clone();
        let token = state.store.add_item(item)?;
        info!(%id, %token, "Item added to cart.");
      }
      println!("Cart now holds {} item(s).", state.store.count()?);
    }
    Commands::Remove { id } => {
      let total = state.store.remove_item(&CartItemId::new(id))?;
      println!("New total: {}", rentcart::model::format_display(&symbol, total));
    }
    Commands::Clear => {
      state.store.clear()?;
      println!("Cart cleared.");
    }
    Commands::Contact {
      first_name,
      last_name,
      email,
      phone,
      driving_license,
      id,
    } => {
      let apply = |item: &mut CartItem| {
        item.first_name = first_name.clone();
        item.last_name = last_name.clone();
        item.email = email.clone();
        item.phone = phone.clone();
        if let Some(license) = &driving_license {
          item.driving_license = license.clone();
        }
      };
      let targets: Vec<CartItemId> = match id {
        Some(id) => vec![CartItemId::new(id)],
        None => state.store.load()?.1.into_iter().map(|item| item.id).collect(),
      };
      for target in targets {
        if !state.store.update_item(&target, &apply)? {
          return Err(CliError::ItemNotFound(target.to_string()));
        }
      }
      println!("Contact details saved.");
    }
    Commands::Checkout { provider } => {
      pending::ensure_clear(&storage_dir)?;
      let presenter = state.presenter(provider)?;
      let (view, toast) = presenter.checkout(now).await?;
      print_toast(&toast);
      if let CheckoutState::ReconciliationNeeded { capture_id, reason } = presenter.checkout_state() {
        eprintln!("Unreconciled capture {capture_id}: {reason}");
        pending::record(
          &storage_dir,
          &UnreconciledCapture {
            capture_id,
            reason,
            recorded_at: Utc::now(),
          },
        )?;
      }
      if !view.is_empty() {
        print_view(&view);
      }
    }
    Commands::Dismiss => match pending::dismiss(&storage_dir)? {
      Some(capture) => println!("Dismissed unreconciled capture {}.", capture.capture_id),
      None => println!("Nothing to dismiss."),
    },
  }
  Ok(())
}

fn read_items(file: &Path) -> Result<Vec<CartItem>> {
  let raw = std::fs::read_to_string(file).map_err(|e| CliError::ItemFile(format!("{}: {e}", file.display())))?;
  let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| CliError::ItemFile(e.to_string()))?;
  let items = if value.is_array() {
    serde_json::from_value(value)
  } else {
    serde_json::from_value::<CartItem>(value).map(|item| vec![item])
  };
  items.map_err(|e| CliError::ItemFile(e.to_string()))
}

fn print_view(view: &CartView) {
  if view.is_empty() {
    println!("Your cart is empty.");
    return;
  }
  for row in &view.rows {
    println!("[{}] {} {} ({} seats, {})", row.id, row.brand, row.vehicle, row.seats, row.transmission);
    println!("    {} at {}, {} day(s)", row.schedule, row.location, row.days);
    println!("    base {}  CDW {}  total {}", row.base_price, row.cdw_total, row.total_price);
    if let Some(label) = row.discount_label {
      println!("    {label}");
    }
  }
  println!("Total: {}", view.total);
}

fn print_toast(toast: &Toast) {
  println!("[{:?}] {}", toast.level, toast.message);
}
