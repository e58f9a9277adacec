//! Validated search parameters and the search-surface URL they map to.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::{AppConfig, ConfigError};

const MAPS_SEARCH_BASE: &str = "https://www.google.com/maps/search";

/// Characters escaped inside the `/search/{query}/` path segment.
const QUERY_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One search request: what to look for, where, and how many results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub limit: usize,
    pub latitude: String,
    pub longitude: String,
    pub zoom: u8,
}

impl SearchParams {
    /// Builds search parameters, rejecting a blank query or a zero limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSearch`] when the query is blank or
    /// `limit` is zero.
    pub fn new(
        query: &str,
        limit: usize,
        latitude: &str,
        longitude: &str,
        zoom: u8,
    ) -> Result<Self, ConfigError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ConfigError::InvalidSearch(
                "search query must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(ConfigError::InvalidSearch(
                "result limit must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            query: query.to_string(),
            limit,
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            zoom,
        })
    }

    /// Builds search parameters using the coordinates and zoom from `config`.
    ///
    /// # Errors
    ///
    /// See [`SearchParams::new`].
    pub fn from_config(config: &AppConfig, query: &str, limit: usize) -> Result<Self, ConfigError> {
        Self::new(query, limit, &config.latitude, &config.longitude, config.zoom)
    }

    /// The map-search URL centred on the configured coordinates.
    #[must_use]
    pub fn search_url(&self) -> String {
        let query = utf8_percent_encode(&self.query, QUERY_SEGMENT);
        format!(
            "{MAPS_SEARCH_BASE}/{query}/@{},{},{}z",
            self.latitude, self.longitude, self.zoom
        )
    }
}
