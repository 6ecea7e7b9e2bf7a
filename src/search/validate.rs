//! Input guard that runs before any search request is issued

use crate::search::filters::SearchFilters;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Longest accepted query or location, in characters
pub const MAX_INPUT_LEN: usize = 100;

/// A rejected filter value; the display text is shown to the user as-is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Search query contains invalid characters (< > {{ }} are not allowed)")]
    QueryCharacters,

    #[error("Search query must be {max} characters or fewer")]
    QueryTooLong { max: usize },

    #[error("Location contains invalid characters (< > {{ }} are not allowed)")]
    LocationCharacters,

    #[error("Location must be {max} characters or fewer")]
    LocationTooLong { max: usize },
}

fn forbidden_chars() -> &'static Regex {
    static FORBIDDEN: OnceLock<Regex> = OnceLock::new();
    FORBIDDEN.get_or_init(|| Regex::new(r"[<>{}]").expect("static pattern"))
}

/// Collapse a whitespace-only query to the empty string
pub fn normalize(filters: &mut SearchFilters) {
    if filters.query.trim().is_empty() && !filters.query.is_empty() {
        filters.query.clear();
    }
}

/// Check the filters, returning the first violated rule
pub fn validate(filters: &SearchFilters) -> Result<(), ValidationError> {
    let query = filters.query.trim();
    if !query.is_empty() && forbidden_chars().is_match(query) {
        return Err(ValidationError::QueryCharacters);
    }
    if query.chars().count() > MAX_INPUT_LEN {
        return Err(ValidationError::QueryTooLong { max: MAX_INPUT_LEN });
    }

    let location = filters.location.trim();
    if !location.is_empty() {
        if forbidden_chars().is_match(location) {
            return Err(ValidationError::LocationCharacters);
        }
        if location.chars().count() > MAX_INPUT_LEN {
            return Err(ValidationError::LocationTooLong { max: MAX_INPUT_LEN });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_query(query: &str) -> SearchFilters {
        SearchFilters {
            query: query.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_markup_in_query() {
        assert_eq!(
            validate(&with_query("<script>")),
            Err(ValidationError::QueryCharacters)
        );
        assert_eq!(
            validate(&with_query("{{ template }}")),
            Err(ValidationError::QueryCharacters)
        );
        assert_eq!(validate(&with_query("normal text")), Ok(()));
    }

    #[test]
    fn enforces_query_length() {
        assert_eq!(validate(&with_query(&"a".repeat(100))), Ok(()));
        assert_eq!(
            validate(&with_query(&"a".repeat(101))),
            Err(ValidationError::QueryTooLong { max: 100 })
        );
        // Surrounding whitespace does not count
        assert_eq!(validate(&with_query(&format!("  {}  ", "a".repeat(100)))), Ok(()));
    }

    #[test]
    fn length_is_counted_in_characters() {
        assert_eq!(validate(&with_query(&"é".repeat(100))), Ok(()));
    }

    #[test]
    fn character_rule_runs_before_length_rule() {
        let query = format!("<{}", "a".repeat(120));
        assert_eq!(
            validate(&with_query(&query)),
            Err(ValidationError::QueryCharacters)
        );
    }

    #[test]
    fn dangerous_characters_are_rejected_even_among_whitespace() {
        assert_eq!(
            validate(&with_query("   >   ")),
            Err(ValidationError::QueryCharacters)
        );
    }

    #[test]
    fn checks_location() {
        let mut filters = SearchFilters {
            location: "Main St <b>".into(),
            ..Default::default()
        };
        assert_eq!(validate(&filters), Err(ValidationError::LocationCharacters));

        filters.location = "x".repeat(101);
        assert_eq!(
            validate(&filters),
            Err(ValidationError::LocationTooLong { max: 100 })
        );

        filters.location = "Bristol".into();
        assert_eq!(validate(&filters), Ok(()));
    }

    #[test]
    fn whitespace_query_is_normalized_not_rejected() {
        let mut filters = with_query("  ");
        normalize(&mut filters);
        assert_eq!(filters.query, "");
        assert_eq!(validate(&filters), Ok(()));
    }

    #[test]
    fn normalize_keeps_real_queries() {
        let mut filters = with_query(" desk lamp ");
        normalize(&mut filters);
        assert_eq!(filters.query, " desk lamp ");
    }
}
