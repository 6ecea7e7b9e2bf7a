//! Wire models for the marketplace backend
//!
//! The backend has shipped more than one JSON envelope over time, so the
//! response shapes are normalized here and nothing past this module sees them.

use crate::error::{Result, SwapboardError};
use crate::geo::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A listed item, as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default, alias = "user")]
    pub owner: Option<Owner>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Item {
    /// Distance in kilometres from `origin`, if the item carries a position
    pub fn distance_from(&self, origin: &Coordinates) -> Option<f64> {
        self.coordinates.map(|c| origin.distance_to(&c))
    }

    pub fn owner_name(&self) -> &str {
        match &self.owner {
            Some(Owner::Profile(profile)) if !profile.username.is_empty() => &profile.username,
            Some(Owner::Profile(profile)) => &profile.id,
            Some(Owner::Id(id)) => id,
            None => "",
        }
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(ImageRef::url)
    }
}

/// Image entries are either bare URLs or `{ "url": ... }` objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Object { url: String },
}

impl ImageRef {
    pub fn url(&self) -> &str {
        match self {
            ImageRef::Url(url) | ImageRef::Object { url } => url,
        }
    }
}

/// The owner reference: an id, or a populated user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    Id(String),
    Profile(OwnerProfile),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerProfile {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub username: String,
}

/// One page of search results in canonical form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPage {
    pub items: Vec<Item>,
    pub total: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchEnvelope {
    Items {
        items: Vec<Item>,
        #[serde(default)]
        total: Option<u64>,
    },
    Data {
        data: Vec<Item>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl SearchPage {
    /// Decode either `{items, total}` or `{data, total}`.
    ///
    /// A missing total falls back to the number of items received.
    pub fn from_body(body: &str) -> Result<Self> {
        let envelope: SearchEnvelope = serde_json::from_str(body).map_err(|e| {
            SwapboardError::Decode(format!("search response: {}", e))
        })?;

        let (items, total) = match envelope {
            SearchEnvelope::Items { items, total } => (items, total),
            SearchEnvelope::Data { data, total } => (data, total),
        };
        let total = total.unwrap_or(items.len() as u64);

        Ok(Self { items, total })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemEnvelope {
    Data { data: Item },
    Wrapped { item: Item },
    Bare(Item),
}

/// Decode an item detail response, bare or wrapped
pub fn item_from_body(body: &str) -> Result<Item> {
    let envelope: ItemEnvelope = serde_json::from_str(body)
        .map_err(|e| SwapboardError::Decode(format!("item response: {}", e)))?;

    Ok(match envelope {
        ItemEnvelope::Data { data } => data,
        ItemEnvelope::Wrapped { item } => item,
        ItemEnvelope::Bare(item) => item,
    })
}

#[derive(Deserialize)]
struct UnreadEnvelope {
    #[serde(alias = "unreadCount", alias = "unread")]
    count: u64,
}

/// Decode `{count}` or `{unreadCount}`
pub fn unread_from_body(body: &str) -> Result<u64> {
    let envelope: UnreadEnvelope = serde_json::from_str(body)
        .map_err(|e| SwapboardError::Decode(format!("unread count response: {}", e)))?;
    Ok(envelope.count)
}
