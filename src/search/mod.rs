//! Item search: filters, input validation, paging and the result store

pub mod filters;
pub mod pagination;
pub mod store;
pub mod validate;

pub use filters::{parse_distance, FilterUpdate, SearchFilters, SortOrder};
pub use pagination::{page_window, PageState};
pub use store::{ApplyOutcome, SearchRequest, SearchStore};
pub use validate::{validate, ValidationError};

/// Everything one list request needs
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub filters: SearchFilters,
    pub page: u32,
    pub limit: u32,
}

impl SearchParams {
    /// Query string pairs for `GET /items`.
    ///
    /// Empty text filters are left out; sort, distance, page and limit are
    /// always sent. The origin is only sent when one is set.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let mut query = Vec::with_capacity(10);

        let text = [
            ("q", f.query.trim()),
            ("category", f.category.trim()),
            ("location", f.location.trim()),
            ("condition", f.condition.trim()),
        ];
        for (key, value) in text {
            if !value.is_empty() {
                query.push((key, value.to_string()));
            }
        }

        query.push(("sort", f.sort.as_str().to_string()));
        query.push(("distance", f.distance.to_string()));
        if let Some(origin) = f.coordinates {
            query.push(("lat", origin.lat.to_string()));
            query.push(("lng", origin.lng.to_string()));
        }
        query.push(("page", self.page.to_string()));
        query.push(("limit", self.limit.to_string()));

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn value<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn default_filters_only_send_paging_and_sort() {
        let params = SearchParams {
            filters: SearchFilters::default(),
            page: 1,
            limit: 12,
        };
        let query = params.to_query();
        let keys: Vec<&str> = query.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["sort", "distance", "page", "limit"]);
        assert_eq!(value(&query, "sort"), Some("recent"));
        assert_eq!(value(&query, "distance"), Some("10"));
    }

    #[test]
    fn every_filter_is_serialized() {
        let params = SearchParams {
            filters: SearchFilters {
                query: " desk ".into(),
                category: "furniture".into(),
                location: "Bristol".into(),
                condition: "like-new".into(),
                distance: 2.5,
                sort: SortOrder::Za,
                coordinates: Some(Coordinates::new(51.45, -2.58)),
            },
            page: 3,
            limit: 24,
        };
        let query = params.to_query();
        assert_eq!(value(&query, "q"), Some("desk"));
        assert_eq!(value(&query, "category"), Some("furniture"));
        assert_eq!(value(&query, "location"), Some("Bristol"));
        assert_eq!(value(&query, "condition"), Some("like-new"));
        assert_eq!(value(&query, "sort"), Some("za"));
        assert_eq!(value(&query, "distance"), Some("2.5"));
        assert_eq!(value(&query, "lat"), Some("51.45"));
        assert_eq!(value(&query, "lng"), Some("-2.58"));
        assert_eq!(value(&query, "page"), Some("3"));
        assert_eq!(value(&query, "limit"), Some("24"));
    }
}
