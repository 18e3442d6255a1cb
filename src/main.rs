//! Profile-Reel main entry point
//!
//! This is the command-line interface for the Profile-Reel crawler.

use anyhow::Context;
use clap::Parser;
use profile_reel::catalog::{AddOutcome, Catalog};
use profile_reel::config::{load_config, Config};
use profile_reel::extract::MobileMarkup;
use profile_reel::fetch::{build_http_client, login, Credentials, Fetcher, RetryPolicy};
use profile_reel::ids::{read_id_list, select_range};
use profile_reel::scrape::ProfileScraper;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Profile-Reel: an incremental profile and photo-reel crawler
///
/// Scrapes each listed profile, downloads its photo reel and appends it to
/// the catalog in the configured storage root.
#[derive(Parser, Debug)]
#[command(name = "profile-reel")]
#[command(version)]
#[command(about = "An incremental profile and photo-reel crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// File listing the profile ids to scrape (.txt or .toml)
    #[arg(long, value_name = "FILE")]
    ids: PathBuf,

    /// Index of the first id to scrape
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Index one past the last id to scrape
    #[arg(long)]
    end: Option<usize>,

    /// Login email; the session stays anonymous without it
    #[arg(long, requires = "password")]
    email: Option<String>,

    /// Login password
    #[arg(long, env = "PROFILE_REEL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Counters for the end-of-run summary
#[derive(Debug, Default)]
struct RunSummary {
    added: usize,
    skipped: usize,
    failed: usize,
    photos: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let all_ids = read_id_list(&cli.ids)?;
    tracing::info!("Found {} profile ids", all_ids.len());
    let ids = select_range(&all_ids, cli.start, cli.end);
    tracing::info!(
        "Will attempt to scrape {} profiles with up to {} photos each",
        ids.len(),
        config.crawler.max_photos
    );

    let credentials = match (cli.email, cli.password) {
        (Some(email), Some(password)) => Some(Credentials { email, password }),
        _ => None,
    };

    match run(&config, ids, credentials.as_ref()).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
            Err(e)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("profile_reel=info,warn"),
            1 => EnvFilter::new("profile_reel=debug,info"),
            2 => EnvFilter::new("profile_reel=trace,debug"),
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

/// Scrapes every id into the catalog, then saves it
///
/// Per-profile failures are logged and skipped; consistency errors abort
/// the run before anything is saved.
async fn run(
    config: &Config,
    ids: &[String],
    credentials: Option<&Credentials>,
) -> anyhow::Result<RunSummary> {
    let base_url = Url::parse(&config.session.base_url)?;
    let client = build_http_client(&config.session)?;

    if let Some(credentials) = credentials {
        login(&client, &base_url, credentials).await?;
        tracing::info!("Logged in as {}", credentials.email);
        tokio::time::sleep(config.crawler.entity_delay()).await;
    }

    let policy = RetryPolicy {
        attempts: config.crawler.attempts,
        retry_delay: config.crawler.retry_delay(),
    };
    let fetcher = Fetcher::new(client, base_url, policy);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(
        &fetcher,
        &extractor,
        config.crawler.request_delay(),
        config.crawler.max_photos,
    );

    let mut catalog = Catalog::load(&config.storage.root)?;
    let mut summary = RunSummary::default();

    for id in ids {
        let outcome = match catalog.add(id, &scraper).await {
            Ok(outcome) => outcome,
            Err(e) => {
                report_uncommitted(&catalog);
                return Err(e.into());
            }
        };

        match outcome {
            // No request was made for a skipped id
            AddOutcome::Skipped => {
                summary.skipped += 1;
                continue;
            }
            AddOutcome::Added { photos, .. } => {
                summary.added += 1;
                summary.photos += photos;
            }
            AddOutcome::Failed { .. } => summary.failed += 1,
        }

        tokio::time::sleep(config.crawler.entity_delay()).await;
    }

    catalog.save()?;
    Ok(summary)
}

/// Logs the folders an aborted run leaves without a stored record
fn report_uncommitted(catalog: &Catalog) {
    match catalog.uncommitted_folders() {
        Ok(folders) if folders.is_empty() => {}
        Ok(folders) => {
            for folder in &folders {
                tracing::error!("Folder {} was not saved to the catalog", folder.display());
            }
            tracing::error!(
                "Remove these {} folders before the next run, the catalog will not load with them",
                folders.len()
            );
        }
        Err(e) => tracing::error!("Could not list uncommitted folders: {}", e),
    }
}

fn print_summary(summary: &RunSummary) {
    println!("=== Profile-Reel Run Summary ===\n");
    println!("  Profiles added:   {}", summary.added);
    println!("  Profiles skipped: {}", summary.skipped);
    println!("  Profiles failed:  {}", summary.failed);
    println!("  Photos downloaded: {}", summary.photos);
}
