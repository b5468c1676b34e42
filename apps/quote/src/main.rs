//! # vantage-quote
//!
//! Command line harness for the Vantage POS discount engine.
//!
//! ```text
//! vantage-quote --campaigns campaigns.json price --cart cart.json --campaign summer-24
//! vantage-quote refund --transaction sale.json --kept kept.json
//! ```
//!
//! Logging goes to stderr (`RUST_LOG` overrides the default filter); the
//! JSON report goes to stdout.

mod commands;
mod config;
mod error;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;
use vantage_core::{SaleItem, Transaction};
use vantage_pricing::DiscountEngine;

use crate::config::QuoteConfig;
use crate::error::{QuoteError, QuoteResult};

/// Price carts and refunds with the Vantage discount engine
#[derive(Debug, Parser)]
#[command(name = "vantage-quote", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, env = "VANTAGE_QUOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Campaign catalog, a JSON array of campaigns
    #[arg(long)]
    campaigns: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a cart (JSON array of sale lines)
    Price {
        #[arg(long)]
        cart: PathBuf,

        /// Campaign id from the catalog; omit for manual discounts only
        #[arg(long)]
        campaign: Option<String>,
    },

    /// Recompute totals for the items a customer keeps
    Refund {
        /// The original sale transaction (JSON)
        #[arg(long)]
        transaction: PathBuf,

        /// Kept sale lines (JSON array)
        #[arg(long)]
        kept: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vantage=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> QuoteResult<()> {
    let mut config = QuoteConfig::load(cli.config)?;
    if let Some(path) = cli.campaigns {
        config.campaign_file = Some(path);
    }

    let engine = Arc::new(DiscountEngine::new(&config.engine));
    let catalog = match &config.campaign_file {
        Some(path) => commands::load_catalog(path)?,
        None => Vec::new(),
    };

    let report = match cli.command {
        Command::Price { cart, campaign } => {
            if campaign.is_some() && config.campaign_file.is_none() {
                return Err(QuoteError::NoCatalog);
            }
            let cart: Vec<SaleItem> = commands::read_json(&cart)?;
            let summary = commands::price(engine, &catalog, &cart, campaign.as_deref())?;
            serde_json::to_string_pretty(&summary)?
        }
        Command::Refund { transaction, kept } => {
            let original: Transaction = commands::read_json(&transaction)?;
            if original.campaign_id.is_some() && config.campaign_file.is_none() {
                return Err(QuoteError::NoCatalog);
            }
            let kept: Vec<SaleItem> = commands::read_json(&kept)?;
            let report = commands::refund(engine, catalog, original, kept)?;
            serde_json::to_string_pretty(&report)?
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", report).map_err(|e| QuoteError::Output(e.to_string()))?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Quote failed");
            ExitCode::from(err.exit_code())
        }
    }
}
