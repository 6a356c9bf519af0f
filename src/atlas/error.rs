//! Error types for Atlas API access.

use thiserror::Error;

use crate::measurement::ResultsError;
use crate::probes::FeedError;

/// Error type for HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed (DNS, refused, reset, TLS, ...).
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Failure of a single request attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}{}", body.as_deref().map(|b| format!(": {b}")).unwrap_or_default())]
    Status {
        /// Response status
        status: http::StatusCode,
        /// Response body, if it was valid UTF-8
        body: Option<String>,
    },
}

/// Error type for fetching data from RIPE Atlas.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A request URL could not be built from the configured base.
    #[error("Invalid Atlas URL: {0}")]
    Url(#[from] url::ParseError),

    /// A request failed with an error that retrying cannot fix.
    #[error("Request to {url} failed: {source}")]
    Request {
        /// Requested URL
        url: String,
        /// The failure
        #[source]
        source: AttemptError,
    },

    /// Every attempt failed with a transient error.
    #[error("Request to {url} failed after {attempts} attempt(s): {last_error}")]
    MaxRetriesExceeded {
        /// Requested URL
        url: String,
        /// Number of attempts made
        attempts: u32,
        /// The last error encountered
        #[source]
        last_error: AttemptError,
    },

    /// The measurement results could not be parsed.
    #[error("Invalid results from {url}: {source}")]
    Results {
        /// Requested URL
        url: String,
        /// Parse failure
        #[source]
        source: ResultsError,
    },

    /// A probe record or the probe archive could not be decoded.
    #[error("Invalid probe data from {url}: {source}")]
    Probes {
        /// Requested URL
        url: String,
        /// Decode failure
        #[source]
        source: FeedError,
    },
}

/// Whether an error is worth another attempt.
pub trait IsRetryable {
    /// Returns true if the error is potentially transient.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidUrl(_) => false,
        }
    }
}

impl IsRetryable for AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_retryable(),
            Self::Status { status, .. } => {
                status.is_server_error()
                    || *status == http::StatusCode::TOO_MANY_REQUESTS
                    || *status == http::StatusCode::REQUEST_TIMEOUT
            }
        }
    }
}
