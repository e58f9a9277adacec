//! Persisted place records.
//!
//! A [`PlaceRecord`] is the terminal unit written to disk: one entry per
//! successfully extracted list item, in discovery order. Text fields that
//! were not present on the detail view are empty strings rather than
//! missing keys, so consumers always see the same shape.

use serde::{Deserialize, Serialize};

/// Latitude/longitude as they appear in the listing URL.
///
/// Kept as strings: the values are copied verbatim from the embedded query
/// string and are not needed as numbers anywhere in the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// One row of the opening-hours table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub day_name: Option<String>,
    pub hours: Option<String>,
}

/// A named group of offered services from the "About" tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub title: Option<String>,
    pub services: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Opaque place identifier taken from the listing URL.
    pub data_id: Option<String>,
    /// Navigation target of the list entry.
    pub url: Option<String>,
    pub title: String,
    /// 1-based discovery rank.
    pub position: u32,
    pub coordinates: Coordinates,
    /// `None` when the rating text was absent or unparsable.
    pub rating: Option<f64>,
    /// `None` when the review count was absent or had no digits.
    pub reviews: Option<u64>,
    #[serde(rename = "type")]
    pub place_type: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub operating_hours: Vec<OperatingHours>,
    pub services: Vec<ServiceGroup>,
}
