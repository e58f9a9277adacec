//! Detail-view extraction for one discovered list entry.
//!
//! [`DetailExtractor::extract`] walks an explicit sequence of
//! [`DetailStage`]s against the session. Any session failure in a waiting or
//! activating stage fails the item and names the stage. Reads inside the
//! extracting stages are independent, so a missing or failing element only
//! blanks its own field.
//!
//! Activation re-locates the entry by its link target before clicking, since
//! the list may have re-rendered since discovery. A click can update the
//! detail panel in place without a document navigation, so the primary view
//! is only read once the URL and the header fingerprint have both moved off
//! what was showing before the click.

mod settle;

pub use settle::{wait_until_stable, SettleOutcome, SettlePolicy};

use std::fmt;
use std::time::Duration;

use placescout_core::{OperatingHours, ServiceGroup};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;

use crate::error::{ItemError, SessionError};
use crate::list_loader::ListHandle;
use crate::listing_ref;
use crate::scripts;
use crate::selectors::{DetailField, ABOUT_TAB, DETAIL_READY};
use crate::session::{ElementHandle, PageSession};

use settle::is_unrendered;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailStage {
    Activate,
    AwaitPrimaryReady,
    ExtractPrimaryFields,
    ActivateSecondaryTab,
    AwaitSecondaryReady,
    ExtractServiceGroups,
    Done,
}

impl fmt::Display for DetailStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DetailStage::Activate => "activate",
            DetailStage::AwaitPrimaryReady => "await_primary_ready",
            DetailStage::ExtractPrimaryFields => "extract_primary_fields",
            DetailStage::ActivateSecondaryTab => "activate_secondary_tab",
            DetailStage::AwaitSecondaryReady => "await_secondary_ready",
            DetailStage::ExtractServiceGroups => "extract_service_groups",
            DetailStage::Done => "done",
        };
        f.write_str(label)
    }
}

/// Raw attributes read from one detail view. Every field is independently
/// optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailAttributes {
    pub title: Option<String>,
    pub rating_text: Option<String>,
    pub review_text: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub operating_hours: Vec<OperatingHours>,
    pub service_groups: Vec<ServiceGroup>,
}

impl DetailAttributes {
    fn set(&mut self, field: DetailField, value: Option<String>) {
        let slot = match field {
            DetailField::Title => &mut self.title,
            DetailField::Rating => &mut self.rating_text,
            DetailField::Reviews => &mut self.review_text,
            DetailField::Category => &mut self.category,
            DetailField::Address => &mut self.address,
            DetailField::Phone => &mut self.phone,
            DetailField::Website => &mut self.website,
        };
        *slot = value;
    }
}

/// What the page showed just before an entry was clicked.
#[derive(Debug, Clone, Default, PartialEq)]
struct ViewMarker {
    href: Option<String>,
    fingerprint: Value,
}

impl ViewMarker {
    async fn capture(session: &dyn PageSession) -> Result<Self, SessionError> {
        let href = session.evaluate(&scripts::location_href()).await?;
        let fingerprint = session.evaluate(&scripts::detail_fingerprint()).await?;
        Ok(Self {
            href: href.as_str().map(str::to_owned),
            fingerprint,
        })
    }

    fn shows(&self, identifier: Option<&str>) -> bool {
        match (self.href.as_deref(), identifier) {
            (Some(href), Some(id)) => href.contains(&format!("!1s{id}")),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DetailExtractor {
    settle: SettlePolicy,
    view_change_timeout: Duration,
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self::new(SettlePolicy::default(), Duration::from_secs(30))
    }
}

impl DetailExtractor {
    /// `view_change_timeout` bounds the wait for the detail view to move to
    /// the clicked entry.
    #[must_use]
    pub fn new(settle: SettlePolicy, view_change_timeout: Duration) -> Self {
        Self {
            settle,
            view_change_timeout,
        }
    }

    /// Opens `handle` and reads its detail view.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::EntryMissing`] when no rendered entry links to
    /// the handle's target any more, and [`ItemError::Stage`] naming the
    /// stage whose session operation failed.
    pub async fn extract(
        &self,
        session: &dyn PageSession,
        handle: &ListHandle,
    ) -> Result<DetailAttributes, ItemError> {
        let mut attributes = DetailAttributes::default();
        let mut before = ViewMarker::default();
        let mut stage = DetailStage::Activate;

        loop {
            tracing::trace!(index = handle.index, %stage, "detail stage");
            stage = match stage {
                DetailStage::Activate => {
                    let element = locate(session, handle).await?;
                    before = ViewMarker::capture(session).await.map_err(at(stage))?;
                    session.click(&element).await.map_err(at(stage))?;
                    DetailStage::AwaitPrimaryReady
                }
                DetailStage::AwaitPrimaryReady => {
                    self.await_primary_ready(session, handle, &before)
                        .await
                        .map_err(at(stage))?;
                    DetailStage::ExtractPrimaryFields
                }
                DetailStage::ExtractPrimaryFields => {
                    read_primary_fields(session, &mut attributes).await;
                    DetailStage::ActivateSecondaryTab
                }
                DetailStage::ActivateSecondaryTab => {
                    match session.query_selector(ABOUT_TAB).await.map_err(at(stage))? {
                        Some(tab) => {
                            session.click(&tab).await.map_err(at(stage))?;
                            DetailStage::AwaitSecondaryReady
                        }
                        None => {
                            tracing::debug!(index = handle.index, "no about tab on detail view");
                            DetailStage::Done
                        }
                    }
                }
                DetailStage::AwaitSecondaryReady => {
                    self.await_secondary_ready(session)
                        .await
                        .map_err(at(stage))?;
                    DetailStage::ExtractServiceGroups
                }
                DetailStage::ExtractServiceGroups => {
                    attributes.service_groups =
                        read_list(session, &scripts::service_groups(), "services").await;
                    DetailStage::Done
                }
                DetailStage::Done => return Ok(attributes),
            };
        }
    }

    async fn await_primary_ready(
        &self,
        session: &dyn PageSession,
        handle: &ListHandle,
        before: &ViewMarker,
    ) -> Result<(), SessionError> {
        session.wait_for_navigation().await?;
        session.wait_for_selector(DETAIL_READY).await?;
        self.await_view_change(session, handle, before).await?;
        let outcome =
            wait_until_stable(session, &scripts::detail_fingerprint(), self.settle).await?;
        tracing::trace!(?outcome, "primary detail view settled");
        Ok(())
    }

    /// Polls until the page has left the view captured before the click.
    ///
    /// The URL must have changed or already name the entry's identifier, and
    /// the header fingerprint must be rendered and differ from before. When
    /// the entry was already open before the click, an unchanged fingerprint
    /// is accepted.
    async fn await_view_change(
        &self,
        session: &dyn PageSession,
        handle: &ListHandle,
        before: &ViewMarker,
    ) -> Result<(), SessionError> {
        let identifier = listing_ref::extract(handle.navigation_target.as_deref()).identifier;
        let identifier = identifier.as_deref();
        let already_open = before.shows(identifier);
        let started = Instant::now();

        loop {
            let now = ViewMarker::capture(session).await?;
            let url_moved = now.shows(identifier) || now.href != before.href;
            let header_moved = !is_unrendered(&now.fingerprint)
                && (already_open || now.fingerprint != before.fingerprint);
            if url_moved && header_moved {
                tracing::trace!(
                    index = handle.index,
                    waited_ms = millis(started.elapsed()),
                    "detail view moved to entry"
                );
                return Ok(());
            }

            let waited = started.elapsed();
            if waited >= self.view_change_timeout {
                return Err(SessionError::Timeout {
                    operation: "detail view to change".to_owned(),
                    waited_ms: millis(waited),
                });
            }
            tokio::time::sleep(self.settle.interval.min(self.view_change_timeout - waited)).await;
        }
    }

    async fn await_secondary_ready(&self, session: &dyn PageSession) -> Result<(), SessionError> {
        match session.wait_for_network_idle().await {
            Ok(()) => {}
            Err(e @ SessionError::Timeout { .. }) => {
                tracing::debug!(error = %e, "network did not go idle after opening about tab");
            }
            Err(e) => return Err(e),
        }
        let outcome =
            wait_until_stable(session, &scripts::service_fingerprint(), self.settle).await?;
        tracing::trace!(?outcome, "about tab settled");
        Ok(())
    }
}

fn at(stage: DetailStage) -> impl Fn(SessionError) -> ItemError {
    move |source| ItemError::Stage { stage, source }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Resolves the list entry that links to the handle's target.
///
/// The discovered element is used when its link still matches. Otherwise the
/// rendered entries are searched for the target. A handle without a target is
/// clicked as discovered.
async fn locate(session: &dyn PageSession, handle: &ListHandle) -> Result<ElementHandle, ItemError> {
    let activate = at(DetailStage::Activate);
    let Some(target) = handle.navigation_target.as_deref() else {
        return Ok(handle.element.clone());
    };

    match session.get_attribute(&handle.element, "href").await {
        Ok(current) if current.as_deref() == Some(target) => return Ok(handle.element.clone()),
        Ok(_) | Err(SessionError::ElementNotFound { .. }) => {}
        Err(e) => return Err(activate(e)),
    }

    for element in session
        .query_selector_all(handle.element.selector())
        .await
        .map_err(&activate)?
    {
        let href = session
            .get_attribute(&element, "href")
            .await
            .map_err(&activate)?;
        if href.as_deref() == Some(target) {
            tracing::debug!(
                index = handle.index,
                moved_to = element.index(),
                "list entry moved since discovery"
            );
            return Ok(element);
        }
    }

    tracing::warn!(index = handle.index, target, "list entry no longer rendered");
    Err(ItemError::EntryMissing {
        target: target.to_owned(),
    })
}

async fn read_primary_fields(session: &dyn PageSession, attributes: &mut DetailAttributes) {
    for field in DetailField::ALL {
        let script = scripts::read(field.selector(), field.read_mode());
        let value = match session.evaluate(&script).await {
            Ok(value) => text_value(&value),
            Err(e) => {
                tracing::warn!(field = field.name(), error = %e, "detail field read failed");
                None
            }
        };
        attributes.set(field, value);
    }
    attributes.operating_hours =
        read_list(session, &scripts::operating_hours(), "operating_hours").await;
}

/// Evaluates a script returning a JSON array and decodes it. Any failure
/// leaves the list empty.
async fn read_list<T: DeserializeOwned>(
    session: &dyn PageSession,
    script: &str,
    field: &str,
) -> Vec<T> {
    let value = match session.evaluate(script).await {
        Ok(Value::Null) => return Vec::new(),
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(field, error = %e, "detail list read failed");
            return Vec::new();
        }
    };
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(field, error = %e, "detail list had an unexpected shape");
        Vec::new()
    })
}

/// Trimmed text of a string value. Blank text counts as absent.
fn text_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
