//! Command-line host for the order client.
//!
//! # Usage
//!
//! ```bash
//! # Point at a local mock backend
//! export ORDER_API_BASE_URL=http://127.0.0.1:3000
//!
//! order-cli config
//! order-cli products
//! order-cli create --email jenny@example.com --name "Jenny Rosen" \
//!     --line1 "1 Main St" --item pins:2 --item shirt
//! order-cli pay --source src_123
//! order-cli status
//! order-cli price 1000 usd
//! ```
//!
//! `pay` and `status` fall back to the persisted active order id when
//! `--order` is omitted.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use order_client::ClientConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "order-cli")]
#[command(author, version, about = "Create and pay orders against the payments backend")]
struct Cli {
    /// Backend base URL (overrides `ORDER_API_BASE_URL`)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// File holding the active order id (overrides `ORDER_STATE_PATH`)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the backend config and whether it runs in live mode
    Config,
    /// List the product catalogue
    Products,
    /// Create an order and make it the active order
    Create(commands::CreateArgs),
    /// Pay an order with a payment source id
    Pay {
        /// Order to pay (defaults to the active order)
        #[arg(long)]
        order: Option<String>,

        /// Payment source id, e.g. `src_...` or `tok_...`
        #[arg(long)]
        source: String,
    },
    /// Show an order's current state
    Status {
        /// Order to look up (defaults to the active order)
        #[arg(long)]
        order: Option<String>,
    },
    /// Print the active order id
    Active,
    /// Format a minor-unit amount as a price
    Price {
        amount: i64,
        currency: String,
    },
}

fn main() {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.set_base_url(&base_url)?;
    }
    if let Some(state) = cli.state {
        config.state_path = state;
    }

    let ctx = commands::Context::new(&config);
    match cli.command {
        Commands::Config => commands::config(&ctx)?,
        Commands::Products => commands::products(ctx)?,
        Commands::Create(args) => commands::create(ctx, args)?,
        Commands::Pay { order, source } => commands::pay(&ctx, order, &source)?,
        Commands::Status { order } => commands::status(&ctx, order)?,
        Commands::Active => commands::active(&ctx)?,
        Commands::Price { amount, currency } => commands::price(&ctx, amount, &currency)?,
    }
    Ok(())
}
