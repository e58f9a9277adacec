//! Chromium-backed [`PageSession`] using chromiumoxide.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{ElementHandle, PageSession};
use crate::error::SessionError;
use crate::scripts;

/// How often selector and network-idle waits re-check the page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Find a Chromium binary: the explicit override first, then `PATH`, then
/// the usual macOS install location.
#[must_use]
pub fn find_chromium(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "configured Chromium path does not exist");
    }

    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,
    /// Quiet window that counts as network quiescence.
    pub network_idle: Duration,
}

impl LaunchOptions {
    #[must_use]
    pub fn from_config(config: &placescout_core::AppConfig) -> Self {
        Self {
            chrome_path: config.chrome_path.clone(),
            headless: config.headless,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            selector_timeout: Duration::from_secs(config.selector_timeout_secs),
            network_idle: Duration::from_millis(config.network_idle_ms),
        }
    }
}

/// One browser with one page, owned exclusively by a scrape run.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    options: LaunchOptions,
}

impl ChromiumSession {
    /// Launches Chromium and opens a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Browser`] if the browser cannot be configured,
    /// launched, or cannot open a page.
    pub async fn launch(options: LaunchOptions) -> Result<Self, SessionError> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .request_timeout(options.navigation_timeout);
        if let Some(path) = find_chromium(options.chrome_path.as_deref()) {
            builder = builder.chrome_executable(path);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| SessionError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Browser(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "chromium handler event error");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Browser(format!("failed to open page: {e}")))?;

        tracing::debug!(headless = options.headless, "chromium session ready");
        Ok(Self {
            browser,
            page,
            handler,
            options,
        })
    }

    /// Closes the browser and stops the CDP event handler.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Browser`] if the browser refuses to close.
    pub async fn close(self) -> Result<(), SessionError> {
        let Self {
            mut browser,
            handler,
            ..
        } = self;
        let result = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| SessionError::Browser(format!("failed to close browser: {e}")));
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "browser process did not exit cleanly");
        }
        handler.abort();
        result
    }

    async fn resolve(&self, handle: &ElementHandle) -> Result<Element, SessionError> {
        let mut elements = self
            .page
            .find_elements(handle.selector())
            .await
            .map_err(|e| SessionError::Script(e.to_string()))?;
        if handle.index() < elements.len() {
            Ok(elements.swap_remove(handle.index()))
        } else {
            Err(SessionError::ElementNotFound {
                selector: handle.selector().to_string(),
                index: handle.index(),
            })
        }
    }

    async fn resource_count(&self) -> Result<u64, SessionError> {
        let value = self.evaluate(&scripts::resource_count()).await?;
        Ok(value.as_u64().unwrap_or(0))
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, SessionError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| SessionError::Script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn wait_for_network_idle(&self) -> Result<(), SessionError> {
        let started = Instant::now();
        let mut last = self.resource_count().await?;
        let mut quiet_since = Instant::now();
        loop {
            if quiet_since.elapsed() >= self.options.network_idle {
                return Ok(());
            }
            if started.elapsed() >= self.options.navigation_timeout {
                return Err(SessionError::Timeout {
                    operation: "network idle".to_string(),
                    waited_ms: millis(started.elapsed()),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            let current = self.resource_count().await?;
            if current != last {
                last = current;
                quiet_since = Instant::now();
            }
        }
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<(), SessionError> {
        let started = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if started.elapsed() >= self.options.selector_timeout {
                return Err(SessionError::Timeout {
                    operation: format!("selector \"{selector}\""),
                    waited_ms: millis(started.elapsed()),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn query_selector_all(
        &self,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, SessionError> {
        let count = self.evaluate(&scripts::count(selector)).await?;
        let count = count
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        Ok((0..count)
            .map(|index| ElementHandle::new(selector, index))
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), SessionError> {
        let target = self.resolve(element).await?;
        target
            .click()
            .await
            .map(|_| ())
            .map_err(|e| SessionError::Script(format!("click failed: {e}")))
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let target = self.resolve(element).await?;
        target
            .attribute(name)
            .await
            .map_err(|e| SessionError::Script(e.to_string()))
    }

    async fn navigate_to(&self, url: &str) -> Result<(), SessionError> {
        bounded("navigation", self.options.navigation_timeout, async {
            self.page
                .goto(url)
                .await
                .map(|_| ())
                .map_err(|e| SessionError::Navigation(e.to_string()))
        })
        .await
    }

    async fn wait_for_navigation(&self) -> Result<(), SessionError> {
        bounded("navigation", self.options.navigation_timeout, async {
            self.page
                .wait_for_navigation()
                .await
                .map(|_| ())
                .map_err(|e| SessionError::Navigation(e.to_string()))
        })
        .await
    }
}

async fn bounded<T, F>(operation: &str, limit: Duration, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::Timeout {
            operation: operation.to_string(),
            waited_ms: millis(limit),
        }),
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
