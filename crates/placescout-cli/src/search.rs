//! `placescout search` handler.
//!
//! Launches the browser, runs the scrape, and persists whatever records were
//! extracted. Per-item failures are logged and counted; only failures that
//! stop the run before extraction starts are returned as errors.

use std::path::Path;

use anyhow::Context;
use placescout_core::{AppConfig, SearchParams};
use placescout_scraper::{ChromiumSession, LaunchOptions, ScrapeOptions, ScraperError};

use crate::output;

pub(crate) struct SearchArgs<'a> {
    pub query: &'a str,
    pub limit: usize,
    pub output_dir: Option<&'a Path>,
    pub headful: bool,
    pub dry_run: bool,
}

/// Runs one search and writes its records to the output directory.
///
/// # Errors
///
/// Returns an error if the search parameters are invalid, the browser cannot
/// be launched, the search surface cannot be loaded, or the results file
/// cannot be written.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs<'_>) -> anyhow::Result<()> {
    let params = SearchParams::from_config(config, args.query, args.limit)?;

    if args.dry_run {
        println!(
            "dry-run: would extract up to {} places from {}",
            params.limit,
            params.search_url()
        );
        return Ok(());
    }

    let mut launch = LaunchOptions::from_config(config);
    if args.headful {
        launch.headless = false;
    }
    tracing::info!(headless = launch.headless, "launching browser");
    let session = ChromiumSession::launch(launch)
        .await
        .map_err(|e| ScraperError::Launch(e.to_string()))?;

    let options = ScrapeOptions::from_config(config);
    let result = placescout_scraper::run(&session, &params, &options).await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
    let report = result.context("scrape run failed")?;

    for failure in &report.failures {
        tracing::warn!(
            index = failure.index,
            position = failure.position,
            target = failure.navigation_target.as_deref().unwrap_or(""),
            error = %failure.error,
            "item skipped"
        );
    }

    let dir = args.output_dir.unwrap_or(config.output_dir.as_path());
    tracing::info!(dir = %dir.display(), "storing results");
    let path = output::write_records(dir, &params.query, &report.records, chrono::Utc::now())?;

    println!("{}", output::summary_line(&report));
    println!("saved: {}", path.display());
    Ok(())
}
