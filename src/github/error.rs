//! Error types surfaced by the harvest pipeline.

use thiserror::Error;

use super::rate_limit::RateLimitInfo;

/// Errors raised while loading configuration, talking to GitHub, or writing
/// artifacts.
///
/// Exactly one variant is recoverable: [`HarvestError::RateLimitExceeded`].
/// The rate-limited invoker consults [`HarvestError::is_retryable`] and
/// retries those indefinitely; every other variant aborts the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HarvestError {
    /// The access token was missing or blank.
    #[error("personal access token is required (set MAGPIE_TOKEN or GITHUB_PAT)")]
    MissingToken,

    /// Configuration could not be resolved.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The API base URL could not be parsed.
    #[error("invalid API base URL: {0}")]
    InvalidApiBase(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Rate limit exceeded - GitHub answered 403 or 429.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Rate limit info if available from response headers.
        rate_limit: Option<RateLimitInfo>,
        /// Error message from GitHub.
        message: String,
    },
}

impl HarvestError {
    /// Returns true when the invoker may retry the failed operation.
    ///
    /// Only the rate-limit signal is classified as transient; everything
    /// else propagates and aborts the run.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{HarvestError, RateLimitInfo};

    #[test]
    fn rate_limit_errors_are_retryable() {
        let error = HarvestError::RateLimitExceeded {
            rate_limit: Some(RateLimitInfo::new(5000, 0, 1_700_000_000)),
            message: "API rate limit exceeded".to_owned(),
        };
        assert!(error.is_retryable());
    }

    #[test]
    fn other_errors_are_not_retryable() {
        let errors = [
            HarvestError::MissingToken,
            HarvestError::Authentication {
                message: "bad credentials".to_owned(),
            },
            HarvestError::Api {
                message: "not found".to_owned(),
            },
            HarvestError::Network {
                message: "connection reset".to_owned(),
            },
            HarvestError::Io {
                message: "disk full".to_owned(),
            },
        ];

        for error in errors {
            assert!(!error.is_retryable(), "{error} should not be retryable");
        }
    }
}
