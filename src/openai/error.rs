//! Error types for the chat-completions client

use thiserror::Error;

use crate::error::DispatchError;

/// Errors that can occur when talking to a chat-completions endpoint
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing or invalid client settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model's call directive could not be dispatched
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http {
            status: err.status().map_or(0, |status| status.as_u16()),
            body: err.to_string(),
        }
    }
}
