//! Results file naming, persistence and the run summary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use placescout_core::PlaceRecord;
use placescout_scraper::ScrapeReport;

/// Lowercase, dash-separated form of `query` for use in a file name.
pub(crate) fn slug(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "search".to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn output_path(dir: &Path, query: &str, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("{}-{}.json", slug(query), now.timestamp_millis()))
}

/// Writes `records` as a pretty-printed JSON array and returns the path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written.
pub(crate) fn write_records(
    dir: &Path,
    query: &str,
    records: &[PlaceRecord],
    now: DateTime<Utc>,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = output_path(dir, query, now);
    let json = serde_json::to_string_pretty(records).context("failed to serialize records")?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub(crate) fn summary_line(report: &ScrapeReport) -> String {
    format!(
        "records: {}  failed: {}  discovered: {}/{}  discovery: {}",
        report.records.len(),
        report.failed_count(),
        report.discovered,
        report.requested,
        report.discovery
    )
}
