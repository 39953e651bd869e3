//! Error handling types.
//!
//! A single tagged variant set, matching the taxonomy the rest of the
//! system is specified against: `ValidationError`, `ConfigError`,
//! `NetworkError`, `RateLimitError`, `StorageError`, `NotFoundError`,
//! `SubprocessError` and `CancellationError`.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gh-star-search.
#[derive(Error, Debug)]
pub enum Error {
    /// User input failed validation (bad query, bad flag combination).
    #[error("{message}")]
    Validation {
        /// Human-readable explanation.
        message: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A remote call failed for a retryable reason (connection reset,
    /// timeout, 5xx).
    #[error("network error: {message}")]
    Network {
        /// Description of the network failure.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote host signalled a rate limit.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimit {
        /// Backoff duration suggested by the remote host.
        retry_after: Duration,
    },

    /// The store failed to complete an operation.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested resource does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// The embedding/summarizer subprocess failed or timed out.
    #[error("subprocess error: {message}")]
    Subprocess {
        /// Description of the subprocess failure.
        message: String,
    },

    /// The operation was cancelled.
    #[error("cancelled: {cause}")]
    Cancelled {
        /// The cancellation cause, propagated unmodified.
        cause: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Build a network error.
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Build a network error with an underlying cause.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a storage error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Build a storage error with an underlying cause.
    pub fn storage_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a not-found error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Build a subprocess error.
    pub fn subprocess<S: Into<String>>(message: S) -> Self {
        Self::Subprocess {
            message: message.into(),
        }
    }

    /// Build a cancellation error, carrying the cause unmodified.
    pub fn cancelled<S: Into<String>>(cause: S) -> Self {
        Self::Cancelled {
            cause: cause.into(),
        }
    }

    /// Whether the caller may retry this error without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimit { .. })
    }
}
