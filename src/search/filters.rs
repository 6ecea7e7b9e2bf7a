//! Filter state for the item search view

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default search radius in kilometres
pub const DEFAULT_DISTANCE_KM: f64 = 10.0;

/// Parse a search radius; only finite, positive kilometre values pass
pub fn parse_distance(text: &str) -> Result<f64, String> {
    let text = text.trim();
    text.parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| format!("Distance must be a positive number, got '{}'", text))
}

/// Result ordering understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Recent,
    Oldest,
    Az,
    Za,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Recent,
        SortOrder::Oldest,
        SortOrder::Az,
        SortOrder::Za,
    ];

    /// Name sent in the `sort` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::Oldest => "oldest",
            SortOrder::Az => "az",
            SortOrder::Za => "za",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Recent => "Newest",
            SortOrder::Oldest => "Oldest",
            SortOrder::Az => "A-Z",
            SortOrder::Za => "Z-A",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortOrder::Recent => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::Az,
            SortOrder::Az => SortOrder::Za,
            SortOrder::Za => SortOrder::Recent,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SortOrder::Recent => SortOrder::Za,
            SortOrder::Oldest => SortOrder::Recent,
            SortOrder::Az => SortOrder::Oldest,
            SortOrder::Za => SortOrder::Az,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .iter()
            .copied()
            .find(|order| order.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort order '{}' (expected recent, oldest, az or za)", s))
    }
}

/// The active filter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: String,
    pub category: String,
    pub location: String,
    pub condition: String,
    /// Radius in kilometres, only meaningful together with `coordinates`
    pub distance: f64,
    pub sort: SortOrder,
    pub coordinates: Option<Coordinates>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: String::new(),
            location: String::new(),
            condition: String::new(),
            distance: DEFAULT_DISTANCE_KM,
            sort: SortOrder::Recent,
            coordinates: None,
        }
    }
}

/// A partial filter set; `None` fields leave the current value untouched.
///
/// `coordinates` is doubly optional so an update can clear them:
/// `Some(None)` removes the origin, `None` keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub query: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub distance: Option<f64>,
    pub sort: Option<SortOrder>,
    pub coordinates: Option<Option<Coordinates>>,
}

impl FilterUpdate {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn sort(sort: SortOrder) -> Self {
        Self {
            sort: Some(sort),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterUpdate::default()
    }
}

impl SearchFilters {
    /// Merge a partial update into the current filters
    pub fn update(&mut self, partial: FilterUpdate) {
        if let Some(query) = partial.query {
            self.query = query;
        }
        if let Some(category) = partial.category {
            self.category = category;
        }
        if let Some(location) = partial.location {
            self.location = location;
        }
        if let Some(condition) = partial.condition {
            self.condition = condition;
        }
        if let Some(distance) = partial.distance {
            self.distance = distance;
        }
        if let Some(sort) = partial.sort {
            self.sort = sort;
        }
        if let Some(coordinates) = partial.coordinates {
            self.coordinates = coordinates;
        }
    }

    /// Reset every field to its default
    pub fn clear(&mut self) {
        *self = SearchFilters::default();
    }

    /// Whether anything differs from the defaults
    pub fn is_filtered(&self) -> bool {
        *self != SearchFilters::default()
    }

    /// One-line description for status bars and CLI headers
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.query.trim().is_empty() {
            parts.push(format!("\"{}\"", self.query.trim()));
        }
        if !self.category.is_empty() {
            parts.push(format!("category={}", self.category));
        }
        if !self.condition.is_empty() {
            parts.push(format!("condition={}", self.condition));
        }
        if !self.location.is_empty() {
            parts.push(format!("location={}", self.location));
        }
        if let Some(origin) = self.coordinates {
            parts.push(format!("within {} km of {}", self.distance, origin));
        }
        parts.push(format!("sort={}", self.sort));
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let filters = SearchFilters::default();
        assert_eq!(filters.distance, 10.0);
        assert_eq!(filters.sort, SortOrder::Recent);
        assert!(filters.query.is_empty());
        assert!(filters.category.is_empty());
        assert!(filters.location.is_empty());
        assert!(filters.condition.is_empty());
        assert!(filters.coordinates.is_none());
        assert!(!filters.is_filtered());
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut filters = SearchFilters::default();
        filters.update(FilterUpdate {
            category: Some("books".into()),
            sort: Some(SortOrder::Az),
            ..Default::default()
        });
        filters.update(FilterUpdate::query("lamp"));

        assert_eq!(filters.query, "lamp");
        assert_eq!(filters.category, "books");
        assert_eq!(filters.sort, SortOrder::Az);
        assert_eq!(filters.distance, DEFAULT_DISTANCE_KM);
    }

    #[test]
    fn update_can_set_and_clear_coordinates() {
        let mut filters = SearchFilters::default();
        let origin = Coordinates::new(52.52, 13.405);

        filters.update(FilterUpdate {
            coordinates: Some(Some(origin)),
            distance: Some(25.0),
            ..Default::default()
        });
        assert_eq!(filters.coordinates, Some(origin));

        filters.update(FilterUpdate::default());
        assert_eq!(filters.coordinates, Some(origin));

        filters.update(FilterUpdate {
            coordinates: Some(None),
            ..Default::default()
        });
        assert!(filters.coordinates.is_none());
        assert_eq!(filters.distance, 25.0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut filters = SearchFilters {
            query: "bike".into(),
            category: "sports".into(),
            location: "Leeds".into(),
            condition: "used".into(),
            distance: 50.0,
            sort: SortOrder::Za,
            coordinates: Some(Coordinates::new(53.8, -1.55)),
        };
        filters.clear();
        assert_eq!(filters, SearchFilters::default());
    }

    #[test]
    fn sort_order_parses_wire_names() {
        for order in SortOrder::ALL {
            assert_eq!(order.as_str().parse::<SortOrder>(), Ok(order));
        }
        assert_eq!(" AZ ".parse::<SortOrder>(), Ok(SortOrder::Az));
        assert!("price".parse::<SortOrder>().is_err());
    }

    #[test]
    fn sort_order_cycles() {
        let mut order = SortOrder::Recent;
        for _ in 0..4 {
            order = order.next();
        }
        assert_eq!(order, SortOrder::Recent);
        assert_eq!(SortOrder::Recent.prev(), SortOrder::Za);
    }

    #[test]
    fn distance_must_be_positive_and_finite() {
        assert_eq!(parse_distance(" 2.5 "), Ok(2.5));
        assert!(parse_distance("0").is_err());
        assert!(parse_distance("-3").is_err());
        assert!(parse_distance("NaN").is_err());
        assert!(parse_distance("inf").is_err());
        assert!(parse_distance("far").is_err());
    }
}
