use thiserror::Error;

use crate::detail::DetailStage;

/// Failures reported by a [`crate::PageSession`] implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("timed out after {waited_ms}ms waiting for {operation}")]
    Timeout { operation: String, waited_ms: u64 },

    #[error("no element matches \"{selector}\" at index {index}")]
    ElementNotFound { selector: String, index: usize },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl SessionError {
    /// Timeouts and vanished elements are render races that can succeed on
    /// a second attempt. Script, navigation and browser failures are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::Timeout { .. } | SessionError::ElementNotFound { .. }
        )
    }
}

/// Fatal pipeline errors. Any of these aborts the run with no partial result.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser session could not be started: {0}")]
    Launch(String),

    #[error("search surface {url} did not load: {source}")]
    Session {
        url: String,
        #[source]
        source: SessionError,
    },

    #[error("list discovery failed: {0}")]
    Discovery(#[source] SessionError),
}

/// Per-item failures. The item is skipped and the run continues.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("{stage} failed: {source}")]
    Stage {
        stage: DetailStage,
        #[source]
        source: SessionError,
    },

    /// No rendered list entry links to the discovered target any more.
    #[error("list entry for {target} is no longer rendered")]
    EntryMissing { target: String },

    #[error("detail extraction did not finish within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("run deadline reached before this item was processed")]
    RunDeadlineExceeded,
}

impl ItemError {
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ItemError::Stage { source, .. } => source.is_transient(),
            ItemError::Timeout { .. } => true,
            ItemError::EntryMissing { .. } | ItemError::RunDeadlineExceeded => false,
        }
    }
}
