//! Error types for Swapboard
//!
//! Every failure a view can hit maps to one of these variants, and each
//! variant knows the message that should be shown to the user.

use crate::search::validate::ValidationError;
use thiserror::Error;

/// Main error type for Swapboard operations
#[derive(Error, Debug)]
pub enum SwapboardError {
    #[error("Invalid search input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with status {status}")]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid item id: '{0}'")]
    InvalidItemId(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for Swapboard operations
pub type Result<T> = std::result::Result<T, SwapboardError>;

impl SwapboardError {
    /// Build a server error from a non-2xx status and the raw response body.
    ///
    /// The backend reports failures as `{"message": ...}` or `{"error": ...}`;
    /// anything else leaves the message empty so the status fallback is used.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .or_else(|| value.get("error"))
                    .and_then(|m| m.as_str())
                    .map(|m| m.trim().to_string())
            })
            .filter(|m| !m.is_empty());

        SwapboardError::Server { status, message }
    }

    /// Text suitable for a toast or a CLI error line
    pub fn user_message(&self) -> String {
        match self {
            SwapboardError::Validation(e) => e.to_string(),
            SwapboardError::Network(_) => {
                "Unable to reach the marketplace. Check your connection and try again.".to_string()
            }
            SwapboardError::Timeout => "The request timed out. Please try again.".to_string(),
            SwapboardError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            SwapboardError::Server {
                status,
                message: None,
            } => status_fallback(*status),
            SwapboardError::InvalidItemId(_) => "Invalid item id".to_string(),
            SwapboardError::Decode(_) => {
                "The marketplace sent a response we could not read.".to_string()
            }
            SwapboardError::Config(msg) => format!("Configuration problem: {}", msg),
            SwapboardError::IoError(e) => format!("File error: {}", e),
            SwapboardError::JsonError(e) => format!("Data error: {}", e),
        }
    }

    /// Check if this error is recoverable (the view stays usable and the user may retry)
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SwapboardError::Config(_) | SwapboardError::IoError(_) | SwapboardError::JsonError(_)
        )
    }
}

fn status_fallback(status: u16) -> String {
    match status {
        400 => "The request was not accepted by the marketplace.".to_string(),
        401 => "Please sign in to continue.".to_string(),
        403 => "You do not have permission to do that.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        429 => "Too many requests. Please slow down and try again.".to_string(),
        500..=599 => "The marketplace is having trouble right now. Please try again later.".to_string(),
        _ => format!("Request failed (status {}).", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_comes_from_payload() {
        let err = SwapboardError::from_status(422, r#"{"message":"Title is required"}"#);
        assert_eq!(err.user_message(), "Title is required");

        let err = SwapboardError::from_status(400, r#"{"error":"bad sort"}"#);
        assert_eq!(err.user_message(), "bad sort");
    }

    #[test]
    fn server_message_falls_back_to_status() {
        let err = SwapboardError::from_status(404, "<html>not found</html>");
        assert_eq!(err.user_message(), "The requested resource was not found.");

        let err = SwapboardError::from_status(503, r#"{"message":"   "}"#);
        assert!(err.user_message().contains("try again later"));

        let err = SwapboardError::from_status(418, "");
        assert_eq!(err.user_message(), "Request failed (status 418).");
    }

    #[test]
    fn each_transport_failure_has_its_own_message() {
        let network = SwapboardError::Network("connection refused".into()).user_message();
        let timeout = SwapboardError::Timeout.user_message();
        let server = SwapboardError::from_status(500, "").user_message();

        assert_ne!(network, timeout);
        assert_ne!(timeout, server);
        assert_ne!(network, server);
    }

    #[test]
    fn only_local_failures_are_unrecoverable() {
        assert!(SwapboardError::Timeout.is_recoverable());
        assert!(SwapboardError::InvalidItemId("x".into()).is_recoverable());
        assert!(!SwapboardError::Config("bad".into()).is_recoverable());
    }
}
