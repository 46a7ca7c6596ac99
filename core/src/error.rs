//! Error types for the Galaxy Missions client core.
//!
//! # Design
//! The variants follow how the screens react to a failure, not how HTTP
//! reports it: `Auth` sends the user back to the login screen, `Validation`
//! and `NotFound` are shown as-is, everything else collapses into a generic
//! "operation failed" notice unless the server supplied a message.

use thiserror::Error;

/// Errors returned by `ApiClient` parse methods, transports and the app facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Invalid credentials, or a missing/expired bearer token.
    #[error("authentication failed{}", detail(.0))]
    Auth(String),

    /// Missing required fields, detected client-side or by the server.
    #[error("validation failed{}", detail(.0))]
    Validation(String),

    /// The server could not be reached or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The server returned 404 for the targeted item.
    #[error("resource not found")]
    NotFound,

    /// Any other non-2xx response. `message` is the server's `{message}` text
    /// when the body carried one, otherwise the raw body.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The session token could not be written or removed.
    #[error("session storage failed: {0}")]
    Storage(String),
}

impl ApiError {
    /// The text the server attached to the failure, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Auth(msg) | ApiError::Validation(msg) if !msg.is_empty() => Some(msg),
            ApiError::Http { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

fn detail(msg: &str) -> String {
    if msg.is_empty() {
        String::new()
    } else {
        format!(": {msg}")
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// Errors raised by a `SessionStore`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("no platform data directory for the session file")]
    NoDataDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_only_for_server_text() {
        assert_eq!(
            ApiError::Auth("Invalid username or password".to_string()).server_message(),
            Some("Invalid username or password")
        );
        assert_eq!(ApiError::Auth(String::new()).server_message(), None);
        assert_eq!(ApiError::NotFound.server_message(), None);
        assert_eq!(ApiError::Network("refused".to_string()).server_message(), None);
        assert_eq!(
            ApiError::Http {
                status: 500,
                message: "boom".to_string()
            }
            .server_message(),
            Some("boom")
        );
    }

    #[test]
    fn display_includes_status() {
        let err = ApiError::Http {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
        assert_eq!(ApiError::Auth(String::new()).to_string(), "authentication failed");
    }
}
