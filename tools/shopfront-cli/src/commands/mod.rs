//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod currency;
pub mod orders;
pub mod products;
pub mod wishlist;

use clap::{Args, Subcommand};

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Only show this category.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only show this availability (in-stock or pre-order).
    #[arg(long)]
    pub stock: Option<String>,

    /// Match product names containing this text.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Cursor from a previous page.
    #[arg(long)]
    pub cursor: Option<String>,

    /// Products per page.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart and its totals.
    Show,
    /// Add one unit of a product.
    Add {
        /// Product ID.
        id: String,
    },
    /// Set the quantity of a line.
    Set {
        /// Product ID.
        id: String,
        /// New quantity (clamped to at least 1).
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Increase a line by one.
    Inc {
        /// Product ID.
        id: String,
    },
    /// Decrease a line by one (never below 1).
    Dec {
        /// Product ID.
        id: String,
    },
    /// Remove a line.
    Remove {
        /// Product ID.
        id: String,
    },
    /// Remove everything.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the wishlist command.
#[derive(Args)]
pub struct WishlistArgs {
    #[command(subcommand)]
    pub command: Option<WishlistCommand>,
}

#[derive(Subcommand)]
pub enum WishlistCommand {
    /// Show saved products.
    Show,
    /// Save a product, or unsave it if already saved.
    Toggle {
        /// Product ID.
        id: String,
    },
    /// Unsave a product.
    Remove {
        /// Product ID.
        id: String,
    },
    /// Unsave everything.
    Clear,
}

/// Arguments for the currency command.
#[derive(Args)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    pub command: Option<CurrencyCommand>,
}

#[derive(Subcommand)]
pub enum CurrencyCommand {
    /// Show the display currency and known rates.
    Show,
    /// Change the display currency.
    Set {
        /// Currency code, e.g. USD.
        code: String,
    },
    /// Convert an amount in the base currency to the display currency.
    Convert {
        /// Amount in base currency units, e.g. 250000.
        amount: String,
    },
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Recipient full name.
    #[arg(long)]
    pub name: Option<String>,

    /// Contact phone number.
    #[arg(long)]
    pub phone: Option<String>,

    /// Street address.
    #[arg(long)]
    pub address: Option<String>,

    /// City.
    #[arg(long)]
    pub city: Option<String>,

    /// District.
    #[arg(long)]
    pub district: Option<String>,

    /// Delivery notes.
    #[arg(long)]
    pub notes: Option<String>,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List placed orders, newest first.
    List {
        /// Show only the last N orders.
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one order.
    Show {
        /// Order ID.
        id: String,
    },
    /// Change an order's status.
    Update {
        /// Order ID.
        id: String,
        /// New status: pending, confirmed or delivered.
        #[arg(short, long)]
        status: String,
        /// Delivery estimate shown to the shopper.
        #[arg(short, long)]
        estimate: Option<String>,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
