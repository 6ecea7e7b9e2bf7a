//! Item detail routes

use crate::error::{Result, SwapboardError};

/// Shortest id the backend ever issues
pub const MIN_ITEM_ID_LEN: usize = 8;

/// Check an item id before navigating to it.
///
/// Rejects empty ids, ids shorter than [`MIN_ITEM_ID_LEN`], and the literal
/// `search`, which shows up when a search URL is mistaken for a detail URL.
pub fn validate_item_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || id.chars().count() < MIN_ITEM_ID_LEN || id == "search" {
        tracing::warn!(id, "rejected item id");
        return Err(SwapboardError::InvalidItemId(id.to_string()));
    }
    Ok(id)
}

/// Path of the item detail page, `/items/:id`
pub fn item_route(id: &str) -> Result<String> {
    let id = validate_item_id(id)?;
    Ok(format!("/items/{}", id))
}

/// Absolute URL of an item page on the web frontend
pub fn item_url(web_base_url: &str, id: &str) -> Result<String> {
    Ok(format!("{}{}", web_base_url.trim_end_matches('/'), item_route(id)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_search_literal() {
        let err = item_route("search").unwrap_err();
        assert!(matches!(err, SwapboardError::InvalidItemId(_)));
        assert_eq!(err.user_message(), "Invalid item id");
    }

    #[test]
    fn rejects_empty_and_short_ids() {
        assert!(item_route("").is_err());
        assert!(item_route("   ").is_err());
        assert!(item_route("abc1234").is_err());
    }

    #[test]
    fn accepts_object_ids() {
        let id = "65f1c2a9e4b0a1b2c3d4e5f6";
        assert_eq!(id.len(), 24);
        assert_eq!(item_route(id).unwrap(), format!("/items/{}", id));
        assert_eq!(item_route("abcd1234").unwrap(), "/items/abcd1234");
    }

    #[test]
    fn builds_web_urls() {
        assert_eq!(
            item_url("http://localhost:5173/", " 65f1c2a9e4b0a1b2c3d4e5f6 ").unwrap(),
            "http://localhost:5173/items/65f1c2a9e4b0a1b2c3d4e5f6"
        );
    }
}
