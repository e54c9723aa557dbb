//! Linkrank main entry point
//!
//! This is the command-line interface for crawling, ranking and serving
//! search results.

use anyhow::Context;
use clap::Parser;
use linkrank::config::{load_config_with_hash, Config};
use linkrank::crawler::{rank_all, run_crawl};
use linkrank::output::{load_statistics, print_crawl_summary, print_statistics};
use linkrank::storage::{open_storage, SqliteStorage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Linkrank: crawl site partitions, rank pages by link structure, search them
///
/// Without a mode flag every configured partition is crawled and ranked in
/// order.
#[derive(Parser, Debug)]
#[command(name = "linkrank")]
#[command(version)]
#[command(about = "Partitioned crawler, link ranker and search server", long_about = None)]
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

    /// Delete stored pages and links of every partition before crawling
    #[arg(long, conflicts_with_all = ["rank_only", "serve", "stats", "dry_run"])]
    fresh: bool,

    /// Recompute rank scores from the stored graph without crawling
    #[arg(long, conflicts_with_all = ["serve", "stats", "dry_run"])]
    rank_only: bool,

    /// Serve search results from the database
    #[arg(long, conflicts_with_all = ["rank_only", "stats", "dry_run"])]
    serve: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["rank_only", "serve", "dry_run"])]
    stats: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["rank_only", "serve", "stats"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.rank_only {
        handle_rank_only(&config)?;
    } else if cli.serve {
        handle_serve(&config).await?;
    } else {
        let reports = run_crawl(config, config_hash, cli.fresh)
            .await
            .context("Crawl failed")?;
        if !cli.quiet {
            print_crawl_summary(&reports);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "linkrank=info,warn",
            1 => "linkrank=debug,tower_http=debug,info",
            2 => "linkrank=trace,debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    open_storage(Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open {}", config.storage.database_path))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Linkrank Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max connections: {}", config.crawler.max_connections);
    println!("  Rate limit: {}ms", config.crawler.rate_limit_ms);
    println!(
        "  Max pages per partition: {}",
        config.crawler.max_pages_per_partition
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nRank:");
    println!("  Damping: {}", config.rank.damping);
    println!("  Tolerance: {}", config.rank.tolerance);
    println!("  Max iterations: {}", config.rank.max_iterations);
    println!("  Max pages: {}", config.rank.max_pages);

    println!("\nStorage: {}", config.storage.database_path);
    println!("Server: {}", config.server.bind_address);

    println!("\nPartitions ({}):", config.partitions.len());
    for entry in &config.partitions {
        if entry.url_patterns.is_empty() {
            println!("  - {} (catch-all, {} seeds)", entry.name, entry.seeds.len());
        } else {
            println!(
                "  - {} (patterns: {}, {} seeds)",
                entry.name,
                entry.url_patterns.join(", "),
                entry.seeds.len()
            );
        }
        for seed in &entry.seeds {
            println!("    * {}", seed);
        }
    }

    if !config.disallow.is_empty() {
        println!("\nDisallowed URLs ({}):", config.disallow.len());
        for url in &config.disallow {
            println!("  - {}", url);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage, &config.partition_names())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --rank-only mode: recomputes every partition's scores
fn handle_rank_only(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;
    for (name, outcome) in rank_all(&mut storage, config)? {
        println!(
            "{}: {} pages ranked in {} iterations{}",
            name,
            outcome.pages,
            outcome.iterations,
            if outcome.converged { "" } else { " (not converged)" }
        );
    }
    Ok(())
}

/// Handles the --serve mode: runs the search server until Ctrl-C
async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    let storage = Arc::new(Mutex::new(open_database(config)?));
    linkrank::server::serve(config, storage)
        .await
        .context("Search server failed")?;
    Ok(())
}
