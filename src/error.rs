//! Error handling for the country atlas client

use std::fmt;

use atlas_auth::AuthError;
use atlas_postgrest::PostgrestError;
use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type
///
/// Every gateway failure resolves to one of these values; the stores keep
/// only its `Display` text.
#[derive(Error, Debug)]
pub enum Error {
    /// The request failed or the provider was unreachable
    #[error("Network error: {0}")]
    Network(String),

    /// The operation needs a session that is absent or invalid
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend rejected submitted data
    #[error("Validation error: {0}")]
    Validation(String),

    /// No entity matches a lookup key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new network error
    pub fn network<T: fmt::Display>(msg: T) -> Self {
        Error::Network(msg.to_string())
    }

    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Classify a failed table read
    pub fn from_select(err: PostgrestError) -> Self {
        match err.status() {
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN) => {
                Error::Auth(err.api_message().unwrap_or_else(|| err.to_string()))
            }
            _ => Error::Network(err.to_string()),
        }
    }

    /// Classify a failed table write
    pub fn from_insert(err: PostgrestError) -> Self {
        match err.status() {
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN) => {
                Error::Auth(err.api_message().unwrap_or_else(|| err.to_string()))
            }
            Some(_) => Error::Validation(err.api_message().unwrap_or_else(|| err.to_string())),
            None => Error::Network(err.to_string()),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ApiError(msg) => Error::Auth(msg),
            other => Error::Auth(other.to_string()),
        }
    }
}
