//! Sitecrawl main entry point
//!
//! This is the command-line interface for the sitecrawl site crawler.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use sitecrawl::config::{load_config, validate, Config, LinkBase};
use sitecrawl::crawler::Crawler;
use sitecrawl::output::{print_statistics, write_csv_report_to_path, CrawlStatistics};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitecrawl: a bounded same-host site crawler
///
/// Starting from a seed URL, sitecrawl follows links that stay on the seed's
/// host, fetching each distinct page at most once, and records the main
/// heading, first paragraph, links and images of every page.
#[derive(Parser, Debug)]
#[command(name = "sitecrawl")]
#[command(version)]
#[command(about = "A bounded same-host site crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from (overrides the config file)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of simultaneous fetches
    #[arg(long, value_name = "N")]
    max_concurrency: Option<u32>,

    /// Maximum number of distinct pages to visit (values below 1 mean 1)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    max_pages: Option<i64>,

    /// Write the CSV page report to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Resolve relative links against the seed URL or the page they appear on
    #[arg(long, value_enum)]
    link_base: Option<LinkBaseArg>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LinkBaseArg {
    Seed,
    Page,
}

impl From<LinkBaseArg> for LinkBase {
    fn from(arg: LinkBaseArg) -> Self {
        match arg {
            LinkBaseArg::Seed => LinkBase::Seed,
            LinkBaseArg::Page => LinkBase::Page,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let report_path = config.output.report_path.clone();

    let crawler = Crawler::new(&config).context("Failed to initialize crawler")?;

    // Ctrl-C stops the crawl; whatever was gathered is still reported
    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            cancel.cancel();
        }
    });

    let report = crawler.crawl().await;

    if !cli.quiet {
        print_statistics(&CrawlStatistics::from_report(&report));
    }

    if let Some(path) = report_path {
        write_csv_report_to_path(Path::new(&path), &report.pages)
            .with_context(|| format!("Failed to write report to {}", path))?;
    }

    Ok(())
}

/// Merges the config file (if any) with command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match (&cli.config, &cli.url) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        (None, Some(url)) => Config::for_seed(url.clone()),
        (None, None) => bail!("A seed URL is required, either as an argument or in --config"),
    };

    if let Some(url) = &cli.url {
        config.crawler.seed_url = url.clone();
    }
    if let Some(n) = cli.max_concurrency {
        config.crawler.max_concurrency = n;
    }
    if let Some(n) = cli.max_pages {
        config.crawler.max_pages = n;
    }
    if let Some(base) = cli.link_base {
        config.crawler.link_base = base.into();
    }
    if let Some(path) = &cli.output {
        config.output.report_path = Some(path.display().to_string());
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
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
