//! Swapboard - terminal client for a community item-exchange marketplace
//!
//! Browse and search listed items, open item pages, and keep an eye on
//! unread messages without leaving the terminal.
//!
//! # Features
//!
//! - **Search**: query, category, location, condition, distance and sort filters
//! - **Paging**: page windows and next/previous navigation over server-side results
//! - **Input guard**: queries are checked before any request is made
//! - **Stale-response protection**: only the newest request's results are shown
//! - **Unread polling**: background refresh of the unread-message count
//! - **History**: recent queries persisted locally
//!
//! # Example
//!
//! ```no_run
//! use swapboard::{AppConfig, FilterUpdate, MarketClient, SearchStore};
//!
//! fn main() -> swapboard::Result<()> {
//!     let config = AppConfig::load()?;
//!     let client = MarketClient::from_config(&config)?;
//!
//!     let mut store = SearchStore::new(config.page_size);
//!     store.update_filters(FilterUpdate::query("road bike"));
//!
//!     for item in store.search(&client)? {
//!         println!("{}: {}", item.id, item.title);
//!     }
//!     println!("page {} of {}", store.page().current_page(), store.page().total_pages());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod notify;
pub mod poll;
pub mod search;
pub mod storage;
pub mod tui;

// Re-export main types
pub use api::{HttpTransport, Item, MarketClient, SearchPage, Transport};
pub use config::AppConfig;
pub use error::{Result, SwapboardError};
pub use geo::Coordinates;
pub use search::{
    page_window, FilterUpdate, PageState, SearchFilters, SearchParams, SearchStore, SortOrder,
};

use chrono::{DateTime, Utc};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format a listing timestamp as a local date string
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// How long ago something was listed, e.g. "3d ago"
pub fn format_age(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return String::new();
    };

    let age = now.signed_duration_since(timestamp);
    if age.num_seconds() < 60 {
        "just now".to_string()
    } else if age.num_minutes() < 60 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_hours() < 24 {
        format!("{}h ago", age.num_hours())
    } else if age.num_days() < 30 {
        format!("{}d ago", age.num_days())
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}
