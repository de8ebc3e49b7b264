//! CLI command implementations.

pub mod config;
pub mod order;
pub mod quote;
pub mod seed;
pub mod serve;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use inkwell_commerce::prelude::*;

/// Find a user by id, or by email when the argument contains `@`.
pub(crate) fn resolve_user(shop: &Shop, key: &str) -> Result<User> {
    if key.contains('@') {
        return shop
            .users()
            .find_by_email(key)?
            .with_context(|| format!("No user with email {key}"));
    }
    Ok(shop.users().get(key)?)
}

/// Find an order by id, or by order number when the argument is numeric.
pub(crate) fn resolve_order(shop: &Shop, key: &str) -> Result<Order> {
    let key = key.trim_start_matches('#');
    match key.parse::<i64>() {
        Ok(number) => Ok(shop.orders().get_by_number(number)?),
        Err(_) => Ok(shop.orders().get(key)?),
    }
}

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Override the listen host.
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Serve from memory; nothing is written on shutdown.
    #[arg(long)]
    pub ephemeral: bool,
}

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// Seed an in-memory copy and report what would be created.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated), e.g. `server.port`.
        key: String,
    },
    /// Set a config value in the config file.
    Set {
        /// Config key (dot-separated).
        key: String,
        /// Value to set. An empty string clears optional values.
        value: String,
    },
    /// Write a default inkwell.toml.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// User id or email whose basket to price.
    pub user: String,
}

/// Arguments for the order command.
#[derive(Args)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// List orders.
    List {
        /// Only orders in this status, e.g. `created` or `inDelivery`.
        #[arg(short, long)]
        status: Option<String>,

        /// Only orders of this user (id or email).
        #[arg(short, long)]
        user: Option<String>,

        /// Page number, starting at 0.
        #[arg(long, default_value = "0")]
        page: usize,

        /// Rows per page.
        #[arg(short, long, default_value = "25")]
        limit: usize,
    },
    /// Show one order by id or order number.
    Show {
        /// Order id or number.
        order: String,
    },
    /// Move an order to another status.
    Status {
        /// Order id or number.
        order: String,
        /// Target status.
        status: String,
    },
}
