//! repo-discovery main entry point
//!
//! This is the command-line interface for discovering the package releases
//! published in product repositories.

use anyhow::{bail, Context};
use clap::Parser;
use repo_discovery::config::{load_config_with_hash, Config};
use repo_discovery::output::{print_summary, write_releases, CrawlStats, ProductSummary};
use repo_discovery::{discover_with_retries, DiscoveryContext, HttpLinkSource, Product, ReleaseRecord};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// repo-discovery: package repository release discovery
///
/// Crawls the configured repository directory listings, verifies that every
/// resolved release actually hosts its packages, and prints the releases as
/// a JSON array on stdout.
#[derive(Parser, Debug)]
#[command(name = "repo-discovery")]
#[command(version)]
#[command(about = "Discovers package releases published in repositories", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Only discover this product (default: every configured product)
    #[arg(long, value_name = "NAME")]
    product: Option<String>,

    /// Only keep releases of this version
    #[arg(long, value_name = "VERSION", requires = "product")]
    product_version: Option<String>,

    /// Number of attempts per product, overrides the configuration
    #[arg(long, value_name = "N")]
    attempts: Option<u32>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    setup_logging(cli.verbose, cli.quiet, config.logging.log_file.as_deref())?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    let products = selected_products(&config, cli.product.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, &products);
        return Ok(());
    }

    let attempts = cli.attempts.unwrap_or(config.crawler.attempts).max(1);
    handle_discovery(config, products, cli.product_version, attempts, cli.quiet).await
}

/// Sets up the logging/tracing subscriber
///
/// Human-readable output goes to stderr, filtered by verbosity. When a log
/// file is configured, the same events are also appended to it as JSON lines.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("repo_discovery=info,warn"),
            1 => EnvFilter::new("repo_discovery=debug,info"),
            2 => EnvFilter::new("repo_discovery=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let json = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            Some(fmt::layer().json().with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json)
        .init();

    Ok(())
}

/// Products named on the command line, or every configured product
fn selected_products(config: &Config, requested: Option<&str>) -> anyhow::Result<Vec<Product>> {
    if let Some(name) = requested {
        return Ok(vec![name.parse::<Product>()?]);
    }

    let mut products = Vec::new();
    for name in config.products.keys() {
        match name.parse::<Product>() {
            Ok(product) => products.push(product),
            Err(e) => tracing::warn!("Ignoring configuration section: {}", e),
        }
    }

    if products.is_empty() {
        bail!("No known product is configured");
    }
    Ok(products)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, products: &[Product]) {
    println!("=== repo-discovery Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Worker pool size: {}", config.crawler.worker_pool_size);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    println!("  Attempts: {}", config.crawler.attempts);

    println!("\nUser Agent:");
    println!(
        "  {}/{}",
        config.user_agent.crawler_name, config.user_agent.crawler_version
    );

    println!("\nProducts ({}):", products.len());
    for product in products {
        println!("  - {}", product);
        let Some(repositories) = config.products.get(product.name()) else {
            println!("    (not configured)");
            continue;
        };
        for (name, source) in repositories {
            let auth = match &source.credentials {
                Some(credentials) => format!(" [credentials: {}]", credentials),
                None => String::new(),
            };
            println!("    * {}: {}{}", name, source.path, auth);
        }
    }

    println!("\nConfiguration is valid. Use without --dry-run to start discovery.");
}

/// Discovers every selected product and prints the releases
async fn handle_discovery(
    config: Config,
    products: Vec<Product>,
    product_version: Option<String>,
    attempts: u32,
    quiet: bool,
) -> anyhow::Result<()> {
    let source = HttpLinkSource::from_config(&config.crawler, &config.user_agent)
        .context("Failed to build HTTP client")?;
    let stats = Arc::new(CrawlStats::new());
    let ctx = DiscoveryContext::new(Arc::new(config), Arc::new(source))
        .with_product_version(product_version)
        .with_stats(stats.clone());

    let mut records: Vec<ReleaseRecord> = Vec::new();
    let mut summaries = Vec::new();
    for product in products {
        let (result, used) = discover_with_retries(product, &ctx, attempts).await;
        let summary = match result {
            Ok(found) => {
                let summary = ProductSummary {
                    product: product.name().to_string(),
                    releases: found.len(),
                    attempts: used,
                    error: None,
                };
                records.extend(found);
                summary
            }
            Err(e) => {
                tracing::error!("Discovery of {} failed: {}", product, e);
                ProductSummary {
                    product: product.name().to_string(),
                    releases: 0,
                    attempts: used,
                    error: Some(e.to_string()),
                }
            }
        };
        summaries.push(summary);
    }

    let stdout = std::io::stdout();
    write_releases(&mut stdout.lock(), &records)?;

    if !quiet {
        print_summary(&summaries, &stats.snapshot());
    }

    let failed: Vec<&str> = summaries
        .iter()
        .filter(|s| !s.succeeded())
        .map(|s| s.product.as_str())
        .collect();
    if !failed.is_empty() {
        bail!("Discovery failed for: {}", failed.join(", "));
    }
    Ok(())
}
