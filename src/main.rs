//! CareerViet Harvest main entry point
//!
//! Command-line interface for the careerviet.vn job-posting harvester.

use anyhow::Context;
use careerviet_harvest::config::{load_config, validate};
use careerviet_harvest::crawler::crawl;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CareerViet Harvest: a bounded job-posting harvester
///
/// Crawls careerviet.vn listing pages, follows job-detail links, and writes
/// normalized job records as JSON Lines, stopping at the configured quota.
#[derive(Parser, Debug)]
#[command(name = "careerviet-harvest")]
#[command(version)]
#[command(about = "Harvest job postings from careerviet.vn", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the result quota from the config file
    #[arg(long, value_name = "N")]
    results_wanted: Option<usize>,

    /// Override the output file path from the config file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    if let Some(n) = cli.results_wanted {
        config.crawl.results_wanted = n;
    }
    if let Some(path) = cli.output {
        config.output.path = path.display().to_string();
    }
    // Overrides go through the same checks as file values
    validate(&config).context("invalid configuration after command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match crawl(config).await {
        Ok(saved) => {
            println!("Finished. Saved {} job(s).", saved);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("careerviet_harvest=info,warn"),
            1 => EnvFilter::new("careerviet_harvest=debug,info"),
            2 => EnvFilter::new("careerviet_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the planned run
fn handle_dry_run(config: &careerviet_harvest::config::Config) {
    println!("=== CareerViet Harvest Dry Run ===\n");

    println!("Crawl:");
    println!("  Results wanted: {}", config.crawl.results_wanted);
    println!("  Max pages per seed: {}", config.crawl.max_pages);
    println!("  Collect details: {}", config.crawl.collect_details);
    println!("  Dedupe: {}", config.crawl.dedupe);
    println!("  Max concurrency: {}", config.crawl.max_concurrency);

    println!("\nSearch:");
    if !config.search.keyword.is_empty() {
        println!("  Keyword: {}", config.search.keyword);
    }
    if !config.search.location.is_empty() {
        println!("  Location: {}", config.search.location);
    }
    if let Some(age) = config.search.max_age_days {
        println!("  Max posting age: {} day(s)", age);
    }

    println!("\nSeed URLs:");
    for seed in config.seed_urls() {
        println!("  - {}", seed);
    }

    println!("\nOutput:");
    println!("  JSON Lines file: {}", config.output.path);

    println!("\n✓ Configuration is valid");
}
