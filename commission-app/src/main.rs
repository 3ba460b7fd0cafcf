//! # Commission Calculator
//!
//! Binary that wires together all the components:
//! - Load configuration from environment and command line
//! - Open the reference-data cache
//! - Create the upstream resolvers and the commission service
//! - Process the input file, one commission per line on stdout

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commission_cache::build_cache;
use commission_client::{BinlistResolver, LiveRateResolver, http_client};
use commission_hex::{BatchProcessor, CommissionService};

#[derive(Parser)]
#[command(name = "commission")]
#[command(author, version, about = "Card transaction commission calculator", long_about = None)]
struct Cli {
    /// Newline-delimited JSON file of transactions
    input: PathBuf,

    /// File holding cached BIN countries and exchange rates
    #[arg(
        long,
        env = "COMMISSION_CACHE_FILE",
        default_value = ".commission-cache.json"
    )]
    cache_file: PathBuf,

    /// Keep the cache in memory only (nothing survives the run)
    #[arg(long)]
    memory_cache: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,commission_app=debug".into());

    // stdout carries commissions only; every diagnostic goes to stderr.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::from_env()?;
    init_tracing(config.json_logs);

    // Fail on a bad input path before spending any upstream quota
    let input = tokio::fs::File::open(&cli.input)
        .await
        .with_context(|| format!("cannot open input file {}", cli.input.display()))?;

    let cache_path = (!cli.memory_cache).then_some(cli.cache_file.as_path());
    let cache = build_cache(cache_path).await?;
    match cache_path {
        Some(path) => tracing::info!("Using cache file: {}", path.display()),
        None => tracing::info!("Using in-memory cache"),
    }

    let http = http_client(config.upstream_timeout)?;

    let countries = BinlistResolver::new(http.clone(), &config.binlist_url, cache.clone())
        .with_requests_per_minute(config.binlist_requests_per_minute);
    let rates = LiveRateResolver::new(
        http,
        &config.exchange_rates_url,
        config.exchange_rates_access_key.clone(),
        config.reference_currency.clone(),
        cache,
    )
    .with_requests_per_minute(config.exchange_rates_requests_per_minute);

    // Create the commission service
    let service = CommissionService::new(countries, rates, config.reference_currency.clone());

    tracing::info!(
        "Calculating commissions in {} for {}",
        config.reference_currency,
        cli.input.display()
    );

    let processor = BatchProcessor::new(service);
    let mut stdout = tokio::io::stdout();
    let summary = processor.run(BufReader::new(input), &mut stdout).await?;

    tracing::debug!(?summary, "done");
    Ok(())
}
