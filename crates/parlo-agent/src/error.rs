//! Relay error types.

use thiserror::Error;

use parlo_channels::DeliveryError;
use parlo_providers::GeneratorError;

/// Why a turn produced no (complete) reply.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The generator failed; nothing was sent.
    #[error("reply generation failed: {0}")]
    Generation(#[from] GeneratorError),

    /// The reply was generated but not fully delivered.
    #[error("reply delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// The turn was cancelled before a reply was generated.
    #[error("turn cancelled before a reply was generated")]
    Cancelled,
}

impl RelayError {
    /// Number of reply parts that reached the recipient before the failure.
    pub fn parts_sent(&self) -> usize {
        match self {
            Self::Delivery(e) => e.sent(),
            Self::Generation(_) | Self::Cancelled => 0,
        }
    }

    /// Whether the recipient got some of the reply but not all of it.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Delivery(e) if e.is_partial())
    }

    /// Whether the same turn could succeed if handled again.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Generation(e) if e.is_retriable())
    }
}
