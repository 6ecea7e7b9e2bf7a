//! Marketplace REST client
//!
//! [`Transport`] is the seam between the client and the network: the real
//! implementation wraps a blocking `reqwest` client with a request deadline,
//! tests substitute an in-memory fake.

pub mod models;
pub mod route;

pub use models::{Item, ImageRef, Owner, OwnerProfile, SearchPage};
pub use route::{item_route, item_url, validate_item_id};

use crate::config::AppConfig;
use crate::error::{Result, SwapboardError};
use crate::search::SearchParams;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Query parameters as `(name, value)` pairs
pub type Query = [(&'static str, String)];

/// Issues GET requests against the backend
pub trait Transport: Send + Sync {
    /// Perform a GET on `path` and return the body of a 2xx response.
    ///
    /// Non-2xx responses become [`SwapboardError::Server`], a missed deadline
    /// becomes [`SwapboardError::Timeout`] and anything that produced no
    /// response at all becomes [`SwapboardError::Network`].
    fn get(&self, path: &str, query: &Query) -> Result<String>;
}

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration, auth_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("swapboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SwapboardError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, query: &Query) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "GET");

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(classify)?;
        let status = response.status();
        let body = response.text().map_err(classify)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "request failed");
            return Err(SwapboardError::from_status(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Sort a `reqwest` failure into timeout, unreadable body, or no response
fn classify(error: reqwest::Error) -> SwapboardError {
    if error.is_timeout() {
        SwapboardError::Timeout
    } else if error.is_decode() || error.is_body() {
        SwapboardError::Decode(error.to_string())
    } else {
        SwapboardError::Network(error.to_string())
    }
}

/// Typed access to the endpoints this client uses
pub struct MarketClient<T: Transport = HttpTransport> {
    transport: T,
}

impl MarketClient<HttpTransport> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = HttpTransport::new(
            &config.api_base_url,
            config.request_timeout(),
            config.auth_token.clone(),
        )?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> MarketClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /items` with the serialized filters and pagination
    pub fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        let body = self.transport.get("/items", &params.to_query())?;
        SearchPage::from_body(&body)
    }

    /// `GET /items/:id`; the id is validated before any request is made
    pub fn item(&self, id: &str) -> Result<Item> {
        let path = item_route(id)?;
        let body = self.transport.get(&path, &[])?;
        models::item_from_body(&body)
    }

    /// `GET /messages/unread-count`
    pub fn unread_count(&self) -> Result<u64> {
        let body = self.transport.get("/messages/unread-count", &[])?;
        models::unread_from_body(&body)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays canned responses and records every request it sees
    #[derive(Default)]
    pub struct FakeTransport {
        responses: Mutex<VecDeque<Result<String>>>,
        pub requests: Mutex<Vec<(String, Vec<(&'static str, String)>)>>,
    }

    impl FakeTransport {
        pub fn with(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, path: &str, query: &Query) -> Result<String> {
            self.requests.lock().push((path.to_string(), query.to_vec()));
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(SwapboardError::Network("no canned response".into())))
        }
    }
}
