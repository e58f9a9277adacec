//! Incremental discovery of a virtualised, infinitely scrolling result list.
//!
//! Each iteration scrolls the container to its current end, waits for the
//! network to go quiet, then re-measures the container's scroll extent and
//! the number of rendered entries. An unchanged extent is the authoritative
//! stop signal. Reaching `limit` exits early. An iteration cap and an
//! optional deadline bound the loop when the extent never settles.

use std::fmt;

use tokio::time::Instant;

use crate::error::SessionError;
use crate::scripts;
use crate::session::{ElementHandle, PageSession};

/// One rendered list entry as seen at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListHandle {
    /// 0-based discovery index.
    pub index: usize,
    pub element: ElementHandle,
    /// The entry's link target, if it had one.
    pub navigation_target: Option<String>,
}

/// Why discovery stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Two consecutive measurements gave the same scroll extent.
    Converged,
    /// At least `limit` entries were rendered.
    LimitReached,
    IterationCapReached,
    DeadlineExceeded,
}

impl fmt::Display for DiscoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiscoveryOutcome::Converged => "converged",
            DiscoveryOutcome::LimitReached => "limit_reached",
            DiscoveryOutcome::IterationCapReached => "iteration_cap_reached",
            DiscoveryOutcome::DeadlineExceeded => "deadline_exceeded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoadPolicy {
    /// Maximum scroll iterations. Must be at least 1.
    pub max_iterations: u32,
    pub deadline: Option<Instant>,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Discovery {
    /// At most `limit` handles, in discovery order.
    pub handles: Vec<ListHandle>,
    pub outcome: DiscoveryOutcome,
    pub iterations: u32,
    /// Entries rendered when the loop stopped, possibly more than `limit`.
    pub rendered: usize,
}

impl Discovery {
    /// True when fewer handles than requested were found.
    #[must_use]
    pub fn is_stalled(&self, limit: usize) -> bool {
        self.handles.len() < limit
    }
}

/// Reveals list entries in `container` until the extent converges or `limit`
/// entries matching `item_selector` are rendered.
///
/// # Errors
///
/// Returns a [`SessionError`] if measuring, scrolling or querying the page
/// fails. A network-idle timeout is not an error: the loop logs it and
/// measures anyway.
pub async fn load(
    session: &dyn PageSession,
    container: &str,
    item_selector: &str,
    limit: usize,
    policy: &LoadPolicy,
) -> Result<Discovery, SessionError> {
    let mut extent = measure_extent(session, container).await?;
    let mut rendered = session.query_selector_all(item_selector).await?.len();
    let mut iterations = 0u32;

    let outcome = if rendered >= limit {
        DiscoveryOutcome::LimitReached
    } else {
        loop {
            if iterations >= policy.max_iterations {
                break DiscoveryOutcome::IterationCapReached;
            }
            if policy.deadline.is_some_and(|d| Instant::now() >= d) {
                break DiscoveryOutcome::DeadlineExceeded;
            }
            iterations += 1;

            session.evaluate(&scripts::scroll_to_end(container)).await?;
            match session.wait_for_network_idle().await {
                Ok(()) => {}
                Err(e @ SessionError::Timeout { .. }) => {
                    tracing::debug!(error = %e, iterations, "network did not go idle after scroll");
                }
                Err(e) => return Err(e),
            }

            let next_extent = measure_extent(session, container).await?;
            rendered = session.query_selector_all(item_selector).await?.len();
            tracing::debug!(iterations, extent = next_extent, rendered, "scrolled result list");

            if rendered >= limit {
                break DiscoveryOutcome::LimitReached;
            }
            if next_extent == extent {
                break DiscoveryOutcome::Converged;
            }
            extent = next_extent;
        }
    };

    let elements = session.query_selector_all(item_selector).await?;
    let mut handles = Vec::with_capacity(limit.min(elements.len()));
    for (index, element) in elements.into_iter().take(limit).enumerate() {
        let navigation_target = session.get_attribute(&element, "href").await?;
        handles.push(ListHandle {
            index,
            element,
            navigation_target,
        });
    }

    tracing::info!(
        %outcome,
        iterations,
        rendered,
        discovered = handles.len(),
        limit,
        "list discovery finished"
    );
    Ok(Discovery {
        handles,
        outcome,
        iterations,
        rendered,
    })
}

/// Current scroll extent of `container`, or 0 when it is not rendered.
async fn measure_extent(session: &dyn PageSession, container: &str) -> Result<u64, SessionError> {
    let value = session.evaluate(&scripts::scroll_extent(container)).await?;
    Ok(value
        .as_u64()
        .or_else(|| value.as_f64().map(truncate_extent))
        .unwrap_or(0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_extent(extent: f64) -> u64 {
    extent.max(0.0).round() as u64
}

#[cfg(test)]
#[path = "list_loader_test.rs"]
mod tests;
