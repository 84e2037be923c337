//! Error types for remote operations

use artalk_community_core::CoreError;
use thiserror::Error;

/// Errors talking to npm, GitHub or the CDN
#[derive(Debug, Error)]
pub enum FetchError {
    // ============ HTTP Errors ============
    #[error("HTTP error: {status} - request to {url} failed")]
    HttpError { status: u16, url: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timeout: {url}")]
    Timeout { url: String },

    #[error("Rate limited by server. Retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    // ============ Authentication Errors ============
    #[error("Authentication required for {url}")]
    AuthRequired { url: String },

    #[error("Authentication failed: {message}")]
    AuthFailed { message: String },

    // ============ Response Errors ============
    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// HTTP status of the failed request, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpError { status, .. } => Some(*status),
            FetchError::AuthRequired { .. } => Some(401),
            FetchError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type for remote operations
pub type Result<T> = std::result::Result<T, FetchError>;

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        if e.is_timeout() {
            FetchError::Timeout { url }
        } else if e.is_connect() {
            FetchError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else if let Some(status) = e.status() {
            FetchError::HttpError {
                status: status.as_u16(),
                url,
            }
        } else {
            FetchError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

/// Errors that abort a whole registry build
///
/// Per-entry network failures never end up here: those entries are dropped.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(
        "{package}@{version} does not declare an `artalk` peer dependency; cannot determine min_artalk_version"
    )]
    MissingPeerDependency { package: String, version: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
