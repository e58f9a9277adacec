//! Capability interface over the interactive page.
//!
//! The pipeline only ever talks to a [`PageSession`]; the Chromium-backed
//! implementation lives in [`chromium`]. One session is one exclusive
//! surface: callers issue operations strictly one at a time.

mod chromium;

pub use chromium::{find_chromium, ChromiumSession, LaunchOptions};

use async_trait::async_trait;

use crate::error::SessionError;

/// Opaque reference to the `index`-th element matching `selector` at the
/// time it was queried.
///
/// Implementations re-resolve the element on every use, so a handle stays
/// valid as long as the page keeps rendering the same list in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    selector: String,
    index: usize,
}

impl ElementHandle {
    #[must_use]
    pub fn new(selector: &str, index: usize) -> Self {
        Self {
            selector: selector.to_owned(),
            index,
        }
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

#[async_trait]
pub trait PageSession: Send + Sync {
    /// Evaluates a JavaScript expression. `undefined` comes back as `Null`.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, SessionError>;

    /// Resolves once no network activity has been observed for the
    /// implementation's idle window.
    async fn wait_for_network_idle(&self) -> Result<(), SessionError>;

    /// Resolves once at least one element matches `selector`.
    async fn wait_for_selector(&self, selector: &str) -> Result<(), SessionError>;

    async fn query_selector_all(&self, selector: &str)
        -> Result<Vec<ElementHandle>, SessionError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), SessionError>;

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SessionError>;

    async fn navigate_to(&self, url: &str) -> Result<(), SessionError>;

    /// Resolves when the navigation triggered by the previous action has
    /// completed.
    async fn wait_for_navigation(&self) -> Result<(), SessionError>;

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, SessionError> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }
}
