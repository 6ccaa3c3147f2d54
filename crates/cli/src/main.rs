//! RocketShoes CLI - catalog listing and cart management.
//!
//! # Usage
//!
//! ```bash
//! # List products with prices and cart quantities
//! rs-cli products
//!
//! # Show the persisted cart
//! rs-cli cart show
//!
//! # Add one unit, set an amount, remove an entry
//! rs-cli cart add 3
//! rs-cli cart update 3 2
//! rs-cli cart remove 3
//! ```
//!
//! Reads the same `ROCKETSHOES_*` environment variables as the storefront,
//! so both share the product service and the stored cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "RocketShoes CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the product catalog
    Products,
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print cart entries and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product ID
        id: ProductId,

        /// New amount (0 or less is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::from_env()?;

    match cli.command {
        Commands::Products => commands::products::list(&ctx).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add { id } => commands::cart::add(&ctx, id).await?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, id).await?,
            CartAction::Update { id, amount } => {
                commands::cart::update(&ctx, id, amount).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["rs-cli", "cart", "update", "3", "-1"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Update { id, amount: -1 }
            } if id == ProductId::new(3)
        ));
    }

    #[test]
    fn test_add_parses_product_id() {
        let cli = Cli::try_parse_from(["rs-cli", "cart", "add", "7"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Add { id }
            } if id == ProductId::new(7)
        ));
    }

    #[test]
    fn test_add_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["rs-cli", "cart", "add", "seven"]).is_err());
    }
}
