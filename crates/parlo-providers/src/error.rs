//! Generator error types.

use thiserror::Error;

/// Errors raised while producing a reply.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The API answered but produced no text.
    #[error("generator returned an empty reply")]
    EmptyReply,

    /// Generator settings are unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GeneratorError {
    /// Whether retrying the same request could succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyReply | Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = GeneratorError::Api {
            status: 429,
            body: "slow down".into(),
        };
        assert_eq!(err.to_string(), "API error 429: slow down");
    }

    #[test]
    fn test_retriable_statuses() {
        let rate = GeneratorError::Api {
            status: 429,
            body: String::new(),
        };
        let server = GeneratorError::Api {
            status: 503,
            body: String::new(),
        };
        let client = GeneratorError::Api {
            status: 400,
            body: String::new(),
        };
        assert!(rate.is_retriable());
        assert!(server.is_retriable());
        assert!(!client.is_retriable());
        assert!(!GeneratorError::EmptyReply.is_retriable());
    }
}
