//! Inkwell CLI - run and operate the Inkwell bookstore.
//!
//! Commands:
//! - `inkwell serve` - Run the HTTP API
//! - `inkwell seed` - Fill an empty database with a sample catalog
//! - `inkwell config` - Manage inkwell.toml
//! - `inkwell quote` - Price a user's basket
//! - `inkwell order` - List, inspect and move orders

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, OrderArgs, QuoteArgs, SeedArgs, ServeArgs};

/// Inkwell - online bookstore back end
#[derive(Parser)]
#[command(name = "inkwell")]
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

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Fill an empty database with a sample catalog
    Seed(SeedArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Price a user's basket
    Quote(QuoteArgs),

    /// Inspect and update orders
    Order(OrderArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &ctx).await,
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
        Commands::Quote(args) => commands::quote::run(args, &ctx).await,
        Commands::Order(args) => commands::order::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_order_status() {
        let cli = Cli::try_parse_from(["inkwell", "--json", "order", "status", "12", "confirmed"])
            .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Order(_)));
    }
}
