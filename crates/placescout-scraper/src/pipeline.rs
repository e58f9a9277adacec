//! End-to-end scrape run over one exclusive [`PageSession`].
//!
//! Navigates to the search surface, discovers list entries, then extracts
//! each entry strictly in discovery order. Failures before discovery
//! completes abort the run. Failures while extracting one entry are recorded
//! in the report and the run moves on to the next entry.

use std::time::Duration;

use placescout_core::{AppConfig, PlaceRecord, SearchParams};
use tokio::time::Instant;

use crate::aggregate::{FieldIssue, ResultAggregator};
use crate::detail::{DetailAttributes, DetailExtractor, SettlePolicy};
use crate::error::{ItemError, ScraperError};
use crate::list_loader::{self, DiscoveryOutcome, ListHandle, LoadPolicy};
use crate::listing_ref;
use crate::retry::retry_with_backoff;
use crate::selectors::{RESULTS_CONTAINER, RESULT_LINK};
use crate::session::PageSession;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub settle: SettlePolicy,
    /// Bound on the wait for the detail view to move to a clicked entry.
    pub view_change_timeout: Duration,
    pub max_scroll_iterations: u32,
    /// Bound on one item's detail extraction, per attempt.
    pub item_timeout: Duration,
    /// Bound on the whole run. Items not started by then are failed.
    pub run_timeout: Option<Duration>,
    pub item_max_retries: u32,
    pub retry_backoff_base: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            settle: SettlePolicy::default(),
            view_change_timeout: Duration::from_secs(30),
            max_scroll_iterations: 200,
            item_timeout: Duration::from_secs(90),
            run_timeout: Some(Duration::from_secs(3600)),
            item_max_retries: 1,
            retry_backoff_base: Duration::from_millis(500),
        }
    }
}

impl ScrapeOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            settle: SettlePolicy {
                interval: Duration::from_millis(config.settle_interval_ms),
                max_wait: Duration::from_millis(config.settle_max_ms),
            },
            view_change_timeout: Duration::from_secs(config.selector_timeout_secs),
            max_scroll_iterations: config.max_scroll_iterations,
            item_timeout: Duration::from_secs(config.item_timeout_secs),
            run_timeout: (config.run_timeout_secs > 0)
                .then(|| Duration::from_secs(config.run_timeout_secs)),
            item_max_retries: config.item_max_retries,
            ..Self::default()
        }
    }
}

/// One list entry that produced no record.
#[derive(Debug)]
pub struct ItemFailure {
    /// 0-based discovery index.
    pub index: usize,
    pub position: u32,
    pub navigation_target: Option<String>,
    pub error: ItemError,
}

#[derive(Debug)]
pub struct ScrapeReport {
    /// Records in discovery order.
    pub records: Vec<PlaceRecord>,
    pub requested: usize,
    /// Handles returned by discovery, at most `requested`.
    pub discovered: usize,
    pub discovery: DiscoveryOutcome,
    pub failures: Vec<ItemFailure>,
    pub field_issues: Vec<FieldIssue>,
}

impl ScrapeReport {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// True when every requested item was discovered and extracted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.discovered >= self.requested
    }
}

/// Runs a full scrape for `params` over `session`.
///
/// # Errors
///
/// Returns [`ScraperError::Session`] if the search surface cannot be loaded
/// and [`ScraperError::Discovery`] if the list cannot be measured or read.
/// Per-item failures are reported in [`ScrapeReport::failures`] instead.
pub async fn run(
    session: &dyn PageSession,
    params: &SearchParams,
    options: &ScrapeOptions,
) -> Result<ScrapeReport, ScraperError> {
    let deadline = options.run_timeout.map(|t| Instant::now() + t);
    let url = params.search_url();

    tracing::info!(query = %params.query, limit = params.limit, "opening search surface");
    session
        .navigate_to(&url)
        .await
        .map_err(|source| ScraperError::Session {
            url: url.clone(),
            source,
        })?;
    session
        .wait_for_selector(RESULTS_CONTAINER)
        .await
        .map_err(|source| ScraperError::Session {
            url: url.clone(),
            source,
        })?;

    let policy = LoadPolicy {
        max_iterations: options.max_scroll_iterations,
        deadline,
    };
    let discovery = list_loader::load(
        session,
        RESULTS_CONTAINER,
        RESULT_LINK,
        params.limit,
        &policy,
    )
    .await
    .map_err(ScraperError::Discovery)?;

    if discovery.is_stalled(params.limit) {
        tracing::warn!(
            outcome = %discovery.outcome,
            discovered = discovery.handles.len(),
            limit = params.limit,
            "discovery stalled before reaching the limit"
        );
    }

    let extractor = DetailExtractor::new(options.settle, options.view_change_timeout);
    let total = discovery.handles.len();
    let mut aggregator = ResultAggregator::new();
    let mut failures = Vec::new();

    for handle in discovery.handles {
        let position = position_of(&handle);
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!(index = handle.index, position, "run deadline reached, skipping item");
            failures.push(ItemFailure {
                index: handle.index,
                position,
                navigation_target: handle.navigation_target,
                error: ItemError::RunDeadlineExceeded,
            });
            continue;
        }

        tracing::info!(item = handle.index + 1, total, "extracting item");
        let listing = listing_ref::extract(handle.navigation_target.as_deref());
        if listing.is_empty() {
            tracing::debug!(index = handle.index, "no listing reference in navigation target");
        }

        match extract_item(session, &extractor, &handle, options).await {
            Ok(detail) => {
                aggregator.push(position, handle.navigation_target, listing, detail);
            }
            Err(error) => {
                tracing::warn!(index = handle.index, position, error = %error, "item extraction failed");
                failures.push(ItemFailure {
                    index: handle.index,
                    position,
                    navigation_target: handle.navigation_target,
                    error,
                });
            }
        }
    }

    let (records, field_issues) = aggregator.into_parts();
    tracing::info!(
        records = records.len(),
        failed = failures.len(),
        discovery = %discovery.outcome,
        "scrape run finished"
    );
    Ok(ScrapeReport {
        records,
        requested: params.limit,
        discovered: total,
        discovery: discovery.outcome,
        failures,
        field_issues,
    })
}

async fn extract_item(
    session: &dyn PageSession,
    extractor: &DetailExtractor,
    handle: &ListHandle,
    options: &ScrapeOptions,
) -> Result<DetailAttributes, ItemError> {
    let timeout = options.item_timeout;
    retry_with_backoff(
        handle.index,
        options.item_max_retries,
        options.retry_backoff_base,
        || {
            let attempt = extractor.extract(session, handle);
            async move {
                tokio::time::timeout(timeout, attempt)
                    .await
                    .map_err(|_| ItemError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    })?
            }
        },
    )
    .await
}

fn position_of(handle: &ListHandle) -> u32 {
    u32::try_from(handle.index + 1).unwrap_or(u32::MAX)
}
