//! Identity and coordinates embedded in a result link.
//!
//! Result links carry a `!`-delimited data segment such as
//! `!1s0x2e69f5:0x1c5!8m2!3d-6.175!4d106.827!16s...`. The identifier follows
//! `!1s`, latitude follows `!3d` and longitude follows `!4d`. The format is
//! undocumented, so a link that does not match degrades to an empty
//! reference instead of failing.

use std::sync::LazyLock;

use regex::Regex;

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!1s(?P<id>[^!]+).*?!3d(?P<latitude>[^!]+)!4d(?P<longitude>[^!?&#/]+)")
        .expect("valid listing reference regex")
});

/// Identifier and coordinates derived from a result link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingReference {
    pub identifier: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl ListingReference {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifier.is_none() && self.latitude.is_none() && self.longitude.is_none()
    }
}

/// Extracts the listing reference from a navigation target.
///
/// Only the first match is used when the target carries several data
/// segments. An absent or non-matching target yields an empty reference.
#[must_use]
pub fn extract(navigation_target: Option<&str>) -> ListingReference {
    let Some(target) = navigation_target else {
        return ListingReference::default();
    };
    let Some(caps) = REFERENCE_RE.captures(target) else {
        return ListingReference::default();
    };
    let group = |name: &str| caps.name(name).map(|m| m.as_str().to_owned());
    ListingReference {
        identifier: group("id"),
        latitude: group("latitude"),
        longitude: group("longitude"),
    }
}
