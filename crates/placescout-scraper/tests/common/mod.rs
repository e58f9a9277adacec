//! Scripted in-memory maps surface for pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use placescout_core::SearchParams;
use placescout_scraper::selectors::{
    DetailField, ABOUT_TAB, DETAIL_READY, RESULTS_CONTAINER, RESULT_LINK,
};
use placescout_scraper::{scripts, ElementHandle, PageSession, ScrapeOptions, SessionError, SettlePolicy};
use serde_json::{json, Value};

/// How a place's detail view misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// The detail marker never appears.
    NeverReady,
    /// The detail marker is missing on the first attempt only.
    FlakyOnce,
    /// Navigation after activation never completes.
    Hangs,
    /// Reading any script on the detail view raises.
    ScriptError,
}

#[derive(Debug, Clone)]
pub struct FakePlace {
    pub title: String,
    pub href: Option<String>,
    pub rating: Option<String>,
    pub reviews: Option<String>,
    pub about_tab: bool,
    pub fault: Fault,
}

impl FakePlace {
    pub fn new(n: usize) -> Self {
        Self {
            title: format!("Place {n}"),
            href: Some(format!(
                "https://www.google.com/maps/place/Place+{n}/data=!4m7!3m6!1sID{n}!8m2!3d-6.{n}!4d106.{n}!16s%2Fg%2F{n}?entry=ttu"
            )),
            rating: Some("4,5".to_owned()),
            reviews: Some(format!("({n}.000)")),
            about_tab: true,
            fault: Fault::None,
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }
}

#[derive(Default)]
struct State {
    frame: usize,
    /// Place index rendered at each list position.
    layout: Vec<usize>,
    href_reads: usize,
    selected: Option<usize>,
    /// Place shown before the most recent click.
    previous: Option<usize>,
    clicked_at: Option<Instant>,
    navigated: Vec<String>,
    attempts: HashMap<usize, u32>,
}

pub struct FakeMapsSession {
    places: Vec<FakePlace>,
    /// `(scroll extent, rendered entries)` per scroll step; the last repeats.
    frames: Vec<(u64, usize)>,
    pub navigation_fails: bool,
    /// How long the previous detail view stays on screen after a click.
    pub stale_for: Duration,
    /// Reverse the rendered list once this many entry links have been read.
    pub reorder_after_reads: Option<usize>,
    state: Mutex<State>,
}

impl FakeMapsSession {
    pub fn new(places: Vec<FakePlace>, frames: &[(u64, usize)]) -> Self {
        let layout = (0..places.len()).collect();
        Self {
            places,
            frames: frames.to_vec(),
            navigation_fails: false,
            stale_for: Duration::ZERO,
            reorder_after_reads: None,
            state: Mutex::new(State {
                layout,
                ..State::default()
            }),
        }
    }

    pub fn navigated(&self) -> Vec<String> {
        self.state.lock().unwrap().navigated.clone()
    }

    pub fn attempts(&self, index: usize) -> u32 {
        self.state
            .lock()
            .unwrap()
            .attempts
            .get(&index)
            .copied()
            .unwrap_or(0)
    }

    fn frame(&self) -> (u64, usize) {
        let state = self.state.lock().unwrap();
        let (extent, rendered) = self.frames[state.frame];
        (extent, rendered.min(self.places.len()))
    }

    fn visible_index(&self, state: &State) -> Option<usize> {
        let stale = state
            .clicked_at
            .is_some_and(|at| at.elapsed() < self.stale_for);
        if stale {
            state.previous
        } else {
            state.selected
        }
    }

    /// The place whose detail view is currently on screen.
    fn visible(&self) -> Option<FakePlace> {
        let state = self.state.lock().unwrap();
        self.visible_index(&state).map(|i| self.places[i].clone())
    }

    fn fingerprint(place: &FakePlace) -> Value {
        let reads = json!([place.title, place.rating, format!("{} Street", place.title)]);
        json!(reads.to_string())
    }

    fn detail_value(place: &FakePlace, script: &str) -> Value {
        let field_value = |field: DetailField| -> Option<Value> {
            (script == scripts::read(field.selector(), field.read_mode())).then(|| match field {
                DetailField::Title => json!(place.title),
                DetailField::Rating => json!(place.rating),
                DetailField::Reviews => json!(place.reviews),
                DetailField::Category => json!("Coffee shop"),
                DetailField::Address => json!(format!("{} Street", place.title)),
                DetailField::Phone => Value::Null,
                DetailField::Website => json!("https://example.com/"),
            })
        };
        if let Some(value) = DetailField::ALL.into_iter().find_map(field_value) {
            return value;
        }
        if script == scripts::operating_hours() {
            return json!([{ "day_name": "Monday", "hours": "08:00–17:00" }]);
        }
        if script == scripts::service_groups() {
            return json!([{ "title": "Service options", "services": ["Dine-in"] }]);
        }
        Value::Null
    }
}

#[async_trait]
impl PageSession for FakeMapsSession {
    async fn evaluate(&self, script: &str) -> Result<Value, SessionError> {
        if script == scripts::scroll_extent(RESULTS_CONTAINER) {
            let (extent, _) = self.frame();
            return Ok(if extent == 0 { Value::Null } else { json!(extent) });
        }
        if script == scripts::scroll_to_end(RESULTS_CONTAINER) {
            let mut state = self.state.lock().unwrap();
            state.frame = (state.frame + 1).min(self.frames.len() - 1);
            return Ok(json!(true));
        }
        let visible = self.visible();
        if script == scripts::location_href() {
            let href = match &visible {
                Some(place) => place.href.clone(),
                None => self.state.lock().unwrap().navigated.last().cloned(),
            };
            return Ok(json!(href));
        }
        let Some(place) = visible else {
            return Ok(Value::Null);
        };
        if place.fault == Fault::ScriptError {
            return Err(SessionError::Script("ReferenceError".to_owned()));
        }
        if script == scripts::detail_fingerprint() {
            return Ok(Self::fingerprint(&place));
        }
        if script == scripts::service_fingerprint() {
            return Ok(if place.about_tab { json!("[1,1]") } else { Value::Null });
        }
        Ok(Self::detail_value(&place, script))
    }

    async fn wait_for_network_idle(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<(), SessionError> {
        if selector != DETAIL_READY {
            return Ok(());
        }
        let state = self.state.lock().unwrap();
        let Some(index) = state.selected else {
            return Ok(());
        };
        let attempts = state.attempts.get(&index).copied().unwrap_or(0);
        let ready = match self.places[index].fault {
            Fault::NeverReady => false,
            Fault::FlakyOnce => attempts > 1,
            _ => true,
        };
        if ready {
            Ok(())
        } else {
            Err(SessionError::Timeout {
                operation: format!("selector \"{selector}\""),
                waited_ms: 30_000,
            })
        }
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementHandle>, SessionError> {
        if selector == RESULT_LINK {
            let (_, rendered) = self.frame();
            return Ok((0..rendered).map(|i| ElementHandle::new(selector, i)).collect());
        }
        if selector == ABOUT_TAB {
            if let Some(place) = self.visible() {
                if place.about_tab {
                    return Ok(vec![ElementHandle::new(selector, 0)]);
                }
            }
        }
        Ok(Vec::new())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), SessionError> {
        if element.selector() == RESULT_LINK {
            let mut state = self.state.lock().unwrap();
            let place = state.layout[element.index()];
            state.previous = self.visible_index(&state);
            state.selected = Some(place);
            state.clicked_at = Some(Instant::now());
            *state.attempts.entry(place).or_insert(0) += 1;
        }
        Ok(())
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        if element.selector() == RESULT_LINK && name == "href" {
            let mut state = self.state.lock().unwrap();
            let href = self.places[state.layout[element.index()]].href.clone();
            state.href_reads += 1;
            if self.reorder_after_reads == Some(state.href_reads) {
                state.layout.reverse();
            }
            return Ok(href);
        }
        Ok(None)
    }

    async fn navigate_to(&self, url: &str) -> Result<(), SessionError> {
        if self.navigation_fails {
            return Err(SessionError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_owned()));
        }
        self.state.lock().unwrap().navigated.push(url.to_owned());
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), SessionError> {
        let selected = self.state.lock().unwrap().selected;
        if let Some(index) = selected {
            if self.places[index].fault == Fault::Hangs {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        }
        Ok(())
    }
}

pub fn places(n: usize) -> Vec<FakePlace> {
    (1..=n).map(FakePlace::new).collect()
}

pub fn params(limit: usize) -> SearchParams {
    SearchParams::new("kopi", limit, "-6.175392", "106.827153", 17).unwrap()
}

pub fn fast_options() -> ScrapeOptions {
    ScrapeOptions {
        settle: SettlePolicy {
            interval: Duration::from_millis(1),
            max_wait: Duration::from_millis(50),
        },
        view_change_timeout: Duration::from_secs(2),
        max_scroll_iterations: 20,
        item_timeout: Duration::from_secs(5),
        run_timeout: None,
        item_max_retries: 1,
        retry_backoff_base: Duration::ZERO,
    }
}
