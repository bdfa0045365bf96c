use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsharvest::config::Config;
use newsharvest::crawler::{ScrapeOptions, Scraper};
use newsharvest::error::HarvestErrorTrait;
use newsharvest::models::ScrapeResponse;

#[derive(Parser)]
#[command(
    name = "newsharvest",
    version,
    about = "Site-adaptive news listing scraper",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape article listings from one or more URLs
    Scrape {
        /// Listing page URLs, scraped concurrently
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pages to fetch per URL
        #[arg(short, long)]
        max_pages: Option<u32>,

        /// Reject sites without a built-in or configured extraction rule set
        #[arg(long, default_value = "false")]
        strict: bool,

        /// Overall time budget per URL in seconds
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// List supported sites
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Scrape {
            urls,
            max_pages,
            strict,
            deadline,
        } => {
            tracing::info!(
                urls = urls.len(),
                max_pages = ?max_pages,
                strict = %strict,
                "Starting scrape command"
            );
            scrape(&config, urls, max_pages, strict, deadline).await?;
        }

        Commands::Sites => {
            let sites = config.registry().sites();
            println!("{}", serde_json::to_string_pretty(&sites)?);
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("newsharvest=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("newsharvest={level},warn"))?
    };

    // Results go to stdout, so logs go to stderr
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}

async fn scrape(
    config: &Config,
    urls: Vec<String>,
    max_pages: Option<u32>,
    strict: bool,
    deadline: Option<u64>,
) -> Result<()> {
    let scraper = Scraper::new(config)?;

    let mut options = ScrapeOptions::from_config(config);
    if let Some(max_pages) = max_pages {
        options.max_pages = max_pages;
    }
    options.require_site_config |= strict;
    if let Some(secs) = deadline {
        options.deadline = Some(Duration::from_secs(secs));
    }

    let results = scraper.scrape_many(&urls, &options).await;

    let responses: Vec<ScrapeResponse> = urls
        .iter()
        .zip(results)
        .map(|(url, result)| match result {
            Ok(articles) => ScrapeResponse::success(url.as_str(), articles),
            Err(e) => {
                tracing::error!(
                    url = %url,
                    error = %e,
                    category = %e.category(),
                    recoverable = e.is_recoverable(),
                    "Scrape failed"
                );
                ScrapeResponse::error(url.as_str(), e.to_string())
            }
        })
        .collect();

    let output = if responses.len() == 1 {
        serde_json::to_string_pretty(&responses[0])?
    } else {
        serde_json::to_string_pretty(&responses)?
    };
    println!("{output}");

    if responses.iter().all(|r| !r.is_success()) {
        anyhow::bail!("All {} scrapes failed", responses.len());
    }

    Ok(())
}
