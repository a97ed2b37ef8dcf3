//! Error types for the market data crate.
//!
//! Every [`MarketDataError`] is fatal for the request that produced it: the
//! price service never caches a bundle when one occurs. Per-symbol failures
//! reported by the provider are not errors at this level; they are carried
//! inside the bundle as [`NormalizedRate::Failed`](crate::models::NormalizedRate::Failed).

use thiserror::Error;

/// Message surfaced to callers when the provider's rate limit was hit.
pub const RATE_LIMIT_MESSAGE: &str =
    "Upstream rate limit exceeded, please retry in a minute";

/// Generic message surfaced to callers for every other fetch failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch price data";

/// Errors that can occur while fetching prices from the upstream provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider signalled that its request quota is exhausted.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider could not be reached or answered with a non-2xx status
    /// that carried no provider error envelope.
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that failed
        provider: String,
        /// Description of the transport failure
        message: String,
    },

    /// The provider rejected the whole request (e.g. invalid API key).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered with a body that is not valid JSON.
    #[error("Malformed response: {provider} - {message}")]
    MalformedResponse {
        /// The provider that sent the response
        provider: String,
        /// Decoder error message
        message: String,
    },
}

impl MarketDataError {
    /// Returns true when the provider's own rate limit caused the failure.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns the message that should be shown to API consumers.
    ///
    /// Rate limiting gets a distinct "retry later" message; everything else
    /// collapses into a generic fetch failure so provider internals do not
    /// leak to clients.
    ///
    /// # Examples
    ///
    /// ```
    /// use metalfx_market_data::errors::{MarketDataError, FETCH_FAILED_MESSAGE};
    ///
    /// let error = MarketDataError::Timeout { provider: "TWELVE_DATA".to_string() };
    /// assert_eq!(error.user_message(), FETCH_FAILED_MESSAGE);
    /// ```
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => RATE_LIMIT_MESSAGE,
            Self::Timeout { .. }
            | Self::Transport { .. }
            | Self::ProviderError { .. }
            | Self::MalformedResponse { .. } => FETCH_FAILED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_distinct() {
        let error = MarketDataError::RateLimited {
            provider: "TWELVE_DATA".to_string(),
        };
        assert!(error.is_rate_limited());
        assert_eq!(error.user_message(), RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_other_errors_use_generic_message() {
        let errors = [
            MarketDataError::Timeout {
                provider: "TWELVE_DATA".to_string(),
            },
            MarketDataError::Transport {
                provider: "TWELVE_DATA".to_string(),
                message: "connection refused".to_string(),
            },
            MarketDataError::ProviderError {
                provider: "TWELVE_DATA".to_string(),
                message: "**apikey** parameter is incorrect".to_string(),
            },
            MarketDataError::MalformedResponse {
                provider: "TWELVE_DATA".to_string(),
                message: "expected value at line 1 column 1".to_string(),
            },
        ];

        for error in errors {
            assert!(!error.is_rate_limited());
            assert_eq!(error.user_message(), FETCH_FAILED_MESSAGE);
        }
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::RateLimited {
            provider: "TWELVE_DATA".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: TWELVE_DATA");

        let error = MarketDataError::Transport {
            provider: "TWELVE_DATA".to_string(),
            message: "HTTP 502 Bad Gateway".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Transport error: TWELVE_DATA - HTTP 502 Bad Gateway"
        );
    }
}
