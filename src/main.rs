//! # Wirescout
//!
//! A page-watching pipeline that scrapes a configured set of web pages for
//! article-like entries, decides which ones are new relative to the previous
//! run, and emails a digest of the difference.
//!
//! ## Features
//!
//! - Declarative per-site extraction rules (container + field CSS selectors)
//! - Heterogeneous date normalization with a strict DD/MM/YYYY precedence
//!   rule ahead of generic parsing
//! - Concurrent, partial-failure-tolerant scraping across all sites
//! - A persisted snapshot backing the new-vs-seen decision
//! - SMTP digest delivery of new articles only
//!
//! ## Usage
//!
//! ```sh
//! wirescout --sites sites.json --state-file state.json
//! ```
//!
//! ## Architecture
//!
//! One invocation is one batch pass:
//! 1. **Configure**: load the site list and SMTP settings, dropping invalid
//!    site specs up front
//! 2. **Scrape**: fetch and extract every site concurrently while the
//!    previous snapshot loads
//! 3. **Diff**: keep records whose identity key is absent from the snapshot
//! 4. **Deliver & persist**: email the new records, then overwrite the
//!    snapshot with the full current set regardless of email outcome

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod extract;
mod fetch;
mod models;
mod notify;
mod run;
mod scrape;
mod state;

use cli::Cli;
use fetch::HttpFetcher;
use notify::{DryRunNotifier, EmailNotifier};
use state::SnapshotStore;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("wirescout starting up");

    if dotenvy::dotenv().is_ok() {
        debug!("Loaded .env file");
    }

    let args = Cli::parse();
    debug!(?args.sites, ?args.state_file, args.dry_run, "Parsed CLI arguments");

    let store = SnapshotStore::new(&args.state_file);
    if args.reset_state {
        store.reset().await?;
        return Ok(());
    }

    // Fatal startup conditions: no usable sites, or (outside dry runs)
    // unusable email settings. Both abort before any network activity.
    let sites = match config::load_sites(args.sites.as_deref()) {
        Ok(sites) => sites,
        Err(e) => {
            error!(error = %e, "Site configuration is unusable");
            return Err(e.into());
        }
    };
    info!(count = sites.len(), "Watching sites");

    let fetcher = HttpFetcher::new()?;

    let summary = if args.dry_run {
        warn!("Dry run: new articles will be logged, not emailed");
        run::run_once(&sites, &fetcher, &DryRunNotifier, &store).await?
    } else {
        let email = match config::email_from_env() {
            Ok(email) => email,
            Err(e) => {
                error!(error = %e, "Email configuration is unusable");
                return Err(e.into());
            }
        };
        let notifier = EmailNotifier::new(&email)?;
        run::run_once(&sites, &fetcher, &notifier, &store).await?
    };

    let elapsed = start_time.elapsed();
    info!(
        total = summary.total,
        new = summary.new,
        notified = summary.notified,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Run complete"
    );

    Ok(())
}
