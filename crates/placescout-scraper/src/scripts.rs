//! JavaScript expressions evaluated through [`crate::PageSession::evaluate`].
//!
//! Every builder is deterministic: the same arguments always produce the
//! same script text. Selectors and attribute names are embedded as JSON
//! string literals so quotes inside selectors cannot break the script.

use crate::selectors::{
    DetailField, ReadMode, HOURS_DAY_CELL, HOURS_ROWS, HOURS_VALUE_CELL, NON_SERVICE_CLASS, SERVICE_GROUPS,
    SERVICE_GROUP_TITLE, SERVICE_ITEM,
};

fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// `scrollHeight` of the first element matching `container`, or `null`.
#[must_use]
pub fn scroll_extent(container: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({sel}); return el ? el.scrollHeight : null; }})()",
        sel = js_str(container)
    )
}

/// Scrolls `container` to its current maximum extent.
#[must_use]
pub fn scroll_to_end(container: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({sel}); if (el) {{ el.scrollTo(0, el.scrollHeight); }} return el !== null; }})()",
        sel = js_str(container)
    )
}

/// Number of elements matching `selector`.
#[must_use]
pub fn count(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", js_str(selector))
}

/// Text or attribute of the first element matching `selector`, or `null`.
#[must_use]
pub fn read(selector: &str, mode: ReadMode) -> String {
    match mode {
        ReadMode::Text => format!(
            "document.querySelector({})?.textContent ?? null",
            js_str(selector)
        ),
        ReadMode::Attribute(name) => format!(
            "document.querySelector({})?.getAttribute({}) ?? null",
            js_str(selector),
            js_str(name)
        ),
    }
}

/// Text of each selector joined into one JSON string, or `null` while none
/// of them has rendered. Used as a cheap "has the view changed" probe.
#[must_use]
pub fn fingerprint(selectors: &[&str]) -> String {
    let reads: Vec<String> = selectors
        .iter()
        .map(|s| format!("document.querySelector({})?.textContent ?? null", js_str(s)))
        .collect();
    format!(
        "(() => {{ const v = [{}]; return v.every((x) => x === null) ? null : JSON.stringify(v); }})()",
        reads.join(", ")
    )
}

/// Fingerprint of the primary detail header: title, rating and address.
#[must_use]
pub fn detail_fingerprint() -> String {
    fingerprint(&[
        DetailField::Title.selector(),
        DetailField::Rating.selector(),
        DetailField::Address.selector(),
    ])
}

/// `[groupCount, itemCount]` for the service groups as a JSON string, or
/// `null` while no group has rendered.
#[must_use]
pub fn service_fingerprint() -> String {
    format!(
        "(() => {{ const g = document.querySelectorAll({groups}).length; \
if (g === 0) {{ return null; }} \
return JSON.stringify([g, document.querySelectorAll({items}).length]); }})()",
        groups = js_str(SERVICE_GROUPS),
        items = js_str(&format!("{SERVICE_GROUPS} {SERVICE_ITEM}")),
    )
}

/// `location.href` of the page.
#[must_use]
pub fn location_href() -> String {
    "window.location.href".to_string()
}

/// Opening-hours rows as `[{ day_name, hours }]`.
#[must_use]
pub fn operating_hours() -> String {
    format!(
        "Array.from(document.querySelectorAll({rows})).map((el) => ({{ \
day_name: el.querySelector({day})?.textContent ?? null, \
hours: el.querySelector({hours})?.textContent ?? null }}))",
        rows = js_str(HOURS_ROWS),
        day = js_str(HOURS_DAY_CELL),
        hours = js_str(HOURS_VALUE_CELL),
    )
}

/// Service groups as `[{ title, services: [..] }]`, skipping non-service
/// entries by class.
#[must_use]
pub fn service_groups() -> String {
    let item_selector = format!("ul li:not([class*='{NON_SERVICE_CLASS}']) span");
    format!(
        "Array.from(document.querySelectorAll({groups})).map((el) => ({{ \
title: el.querySelector({title})?.textContent ?? null, \
services: Array.from(el.querySelectorAll({items})).map((s) => s.textContent ?? null) }}))",
        groups = js_str(SERVICE_GROUPS),
        title = js_str(SERVICE_GROUP_TITLE),
        items = js_str(&item_selector),
    )
}

/// Number of resource-timing entries recorded so far. Stops growing once
/// the page has no requests in flight. The buffer is enlarged first so the
/// default 250-entry cap cannot freeze the count on long sessions.
#[must_use]
pub fn resource_count() -> String {
    "(() => { performance.setResourceTimingBufferSize(1000000); \
return performance.getEntriesByType('resource').length; })()"
        .to_string()
}
