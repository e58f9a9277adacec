pub mod aggregate;
pub mod coerce;
pub mod detail;
pub mod error;
pub mod list_loader;
pub mod listing_ref;
pub mod pipeline;
pub(crate) mod retry;
pub mod scripts;
pub mod selectors;
pub mod session;

pub use aggregate::{assemble, FieldIssue, ResultAggregator};
pub use coerce::{parse_rating, parse_review_count, FieldParseError};
pub use detail::{
    wait_until_stable, DetailAttributes, DetailExtractor, DetailStage, SettleOutcome, SettlePolicy,
};
pub use error::{ItemError, ScraperError, SessionError};
pub use list_loader::{load, Discovery, DiscoveryOutcome, ListHandle, LoadPolicy};
pub use listing_ref::ListingReference;
pub use pipeline::{run, ItemFailure, ScrapeOptions, ScrapeReport};
pub use session::{find_chromium, ChromiumSession, ElementHandle, LaunchOptions, PageSession};
