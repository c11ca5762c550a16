//! # Topic Feed
//!
//! Turns a news topic index page into an RSS 2.0 feed. The page has no feed
//! of its own and no structured listing markup, so articles are recovered
//! heuristically from its anchors.
//!
//! ## Usage
//!
//! ```sh
//! topic_feed --output feed.xml
//! ```
//!
//! ## Architecture
//!
//! A single sequential run:
//! 1. **Fetching**: download the index page
//! 2. **Extraction**: recover article records from its anchors
//! 3. **Rendering**: serialize the records as RSS, fully in memory
//! 4. **Writing**: replace the output file with the new feed
//!
//! Any failure ends the run with a stage-specific exit code and leaves the
//! existing feed untouched.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::FeedConfig;
use error::FeedError;
use outputs::file::{FeedTarget, write_feed};
use scrapers::fetch::fetch_index_page;
use utils::RunClock;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("topic_feed starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(&args).await {
        Ok(count) => {
            let elapsed = start_time.elapsed();
            info!(
                articles = count,
                ?elapsed,
                millis = elapsed.as_millis() as u64,
                "Execution complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, exit_code = e.exit_code(), "Feed update failed");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Fetch, extract, render and write. Returns the number of articles written.
#[instrument(level = "info", skip_all)]
async fn run(args: &Cli) -> Result<usize, FeedError> {
    let mut config = match &args.config {
        Some(path) => FeedConfig::load(path).await?,
        None => FeedConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    let clock = RunClock::system();

    info!(url = %config.index_url, "Fetching index page");
    let markup = fetch_index_page(&config).await?;

    let built = pipeline::build_feed(&markup, &config, &clock)?;
    info!(count = built.records.len(), "Found articles");

    let target = FeedTarget::from_arg(&args.output);
    write_feed(&target, &built.document).await?;

    Ok(built.records.len())
}
