//! Shop CLI - Command line storefront client.
//!
//! Commands:
//! - `shop products` - Browse the catalog
//! - `shop cart` - View and change the cart
//! - `shop wishlist` - Save products for later
//! - `shop currency` - Pick the display currency
//! - `shop checkout` - Place an order for the cart
//! - `shop orders` - Inspect and update placed orders
//! - `shop config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shopfront_observability::{init_logging, LogLevel};

use commands::{
    CartArgs, CheckoutArgs, ConfigArgs, CurrencyArgs, OrdersArgs, ProductsArgs, WishlistArgs,
};

/// Shop CLI - Browse, fill a cart and check out from the terminal
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Display currency for this invocation only
    #[arg(long, global = true)]
    currency: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products(ProductsArgs),

    /// View and change the cart
    Cart(CartArgs),

    /// Save products for later
    Wishlist(WishlistArgs),

    /// Show or change the display currency
    Currency(CurrencyArgs),

    /// Place an order for everything in the cart
    Checkout(CheckoutArgs),

    /// Inspect and update placed orders
    Orders(OrdersArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, cli.currency.clone(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let mut logging = ctx.config.logging.clone();
    if ctx.output.is_verbose() && logging.level > LogLevel::Debug {
        logging.level = LogLevel::Debug;
    }
    if let Err(e) = init_logging(&logging) {
        ctx.output.warn(&format!("Logging disabled: {}", e));
    }

    // Execute command
    let result = match cli.command {
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Wishlist(args) => commands::wishlist::run(args, &ctx).await,
        Commands::Currency(args) => commands::currency::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
