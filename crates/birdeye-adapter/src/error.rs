/*
[INPUT]:  Error sources (dial/handshake, WebSocket, JSON, HTTP, API)
[OUTPUT]: Structured error types with retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Birdeye adapter
#[derive(Error, Debug)]
pub enum BirdeyeError {
    /// Dial or handshake failed, timed out, or was cancelled
    #[error("connection failed: {0}")]
    Connection(String),

    /// A send-family call was made without a live connection
    #[error("conn is nil")]
    NotConnected,

    /// Peer closed the feed
    #[error("connection closed: {reason}")]
    ConnectionClosed { reason: String },

    /// Malformed envelope or payload
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Outbound payload could not be built
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport error after the handshake
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BirdeyeError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BirdeyeError::Connection(_)
                | BirdeyeError::ConnectionClosed { .. }
                | BirdeyeError::WebSocket(_)
                | BirdeyeError::Http(_)
        )
    }

    /// Check if the error means the feed is unusable until `connect` is called again
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            BirdeyeError::Connection(_)
                | BirdeyeError::NotConnected
                | BirdeyeError::ConnectionClosed { .. }
                | BirdeyeError::WebSocket(_)
        )
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        BirdeyeError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }
}

/// Result type alias for Birdeye operations
pub type Result<T> = std::result::Result<T, BirdeyeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_message() {
        assert_eq!(BirdeyeError::NotConnected.to_string(), "conn is nil");
    }

    #[test]
    fn test_error_retryable() {
        let closed = BirdeyeError::ConnectionClosed {
            reason: "going away".to_string(),
        };
        assert!(closed.is_retryable());
        assert!(closed.is_connection_error());

        let ser = BirdeyeError::Serialization("empty batch".to_string());
        assert!(!ser.is_retryable());
        assert!(!ser.is_connection_error());

        assert!(!BirdeyeError::NotConnected.is_retryable());
        assert!(BirdeyeError::NotConnected.is_connection_error());
    }

    #[test]
    fn test_decode_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BirdeyeError = err.into();
        assert!(matches!(err, BirdeyeError::Decode(_)));
    }

    #[test]
    fn test_api_error_creation() {
        let err = BirdeyeError::api_error(StatusCode::UNAUTHORIZED, "invalid api key");
        match err {
            BirdeyeError::Api { code, message } => {
                assert_eq!(code, 401);
                assert_eq!(message, "invalid api key");
            }
            _ => panic!("Expected Api error variant"),
        }
    }
}
