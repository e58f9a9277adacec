//! Merges listing references and detail attributes into [`PlaceRecord`]s.

use placescout_core::{Coordinates, PlaceRecord};

use crate::coerce::{parse_rating, parse_review_count, FieldParseError};
use crate::detail::DetailAttributes;
use crate::listing_ref::ListingReference;

/// A numeric field that fell back to its `None` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub position: u32,
    pub field: &'static str,
    pub error: FieldParseError,
}

/// Builds one record. Pure: numeric coercion failures become `None` plus a
/// [`FieldIssue`], never an error.
#[must_use]
pub fn assemble(
    position: u32,
    url: Option<String>,
    listing: ListingReference,
    detail: DetailAttributes,
) -> (PlaceRecord, Vec<FieldIssue>) {
    let mut issues = Vec::new();
    let mut note = |field: &'static str, error: FieldParseError| {
        issues.push(FieldIssue {
            position,
            field,
            error,
        });
    };

    let rating = match parse_rating(detail.rating_text.as_deref()) {
        Ok(value) => Some(value),
        Err(e) => {
            note("rating", e);
            None
        }
    };
    let reviews = match parse_review_count(detail.review_text.as_deref()) {
        Ok(value) => Some(value),
        Err(e) => {
            note("reviews", e);
            None
        }
    };

    let record = PlaceRecord {
        data_id: listing.identifier,
        url,
        title: detail.title.unwrap_or_default(),
        position,
        coordinates: Coordinates {
            latitude: listing.latitude,
            longitude: listing.longitude,
        },
        rating,
        reviews,
        place_type: detail.category.unwrap_or_default(),
        address: detail.address.unwrap_or_default(),
        phone: detail.phone.unwrap_or_default(),
        website: detail.website.unwrap_or_default(),
        operating_hours: detail.operating_hours,
        services: detail.service_groups,
    };
    (record, issues)
}

/// Ordered result set plus the field issues seen while building it.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Vec<PlaceRecord>,
    field_issues: Vec<FieldIssue>,
}

impl ResultAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the record for `position`. Positions must be pushed in
    /// increasing order.
    pub fn push(
        &mut self,
        position: u32,
        url: Option<String>,
        listing: ListingReference,
        detail: DetailAttributes,
    ) {
        debug_assert!(
            self.records.last().is_none_or(|r| r.position < position),
            "positions must increase"
        );
        let (record, issues) = assemble(position, url, listing, detail);
        for issue in &issues {
            match issue.error {
                FieldParseError::Absent => {
                    tracing::debug!(position, field = issue.field, "numeric field absent");
                }
                FieldParseError::Malformed(ref raw) => {
                    tracing::warn!(position, field = issue.field, raw = %raw, "numeric field malformed");
                }
            }
        }
        self.records.push(record);
        self.field_issues.extend(issues);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<PlaceRecord>, Vec<FieldIssue>) {
        (self.records, self.field_issues)
    }
}
