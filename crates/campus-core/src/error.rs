//! Error types for campusdesk.

use thiserror::Error;

/// Result type alias using campusdesk's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for campusdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed before a response arrived
    #[error("Request error: {0}")]
    Request(String),

    /// The API answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local form validation failed (required field empty, bad value)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session missing or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The entity's gateway does not offer this operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// An action for the same record is still in flight
    #[error("Busy: {0}")]
    Busy(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Collapse any error into the single inline message shown on a screen.
    ///
    /// Transport, API and validation failures all read the same way to the
    /// user; the variant is only kept for logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::Request(_) => "Could not reach the server. Please try again.".to_string(),
            Error::Api { message, .. } if !message.is_empty() => message.clone(),
            Error::Api { status, .. } => format!("The server rejected the request ({status})."),
            Error::Validation(msg) => msg.clone(),
            Error::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            Error::Busy(_) => "Please wait for the current action to finish.".to_string(),
            other => other.to_string(),
        }
    }

    /// True for failures that happened on the wire or at the server.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Request(_) | Error::Api { .. } | Error::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Error::Api {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => Error::Request(e.to_string()),
        }
    }
}
