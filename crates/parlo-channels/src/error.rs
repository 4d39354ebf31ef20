//! Delivery error types.

use thiserror::Error;

/// Why a reply was not fully delivered.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The sender failed; `sent` parts went out before it did.
    #[error("send failed after {sent}/{total} parts: {source}")]
    Transport {
        sent: usize,
        total: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Delivery was cancelled between parts.
    #[error("delivery cancelled after {sent}/{total} parts")]
    Cancelled { sent: usize, total: usize },

    /// There were no parts to send.
    #[error("nothing to send")]
    NothingToSend,
}

impl DeliveryError {
    /// Number of parts delivered before the sequence stopped.
    pub fn sent(&self) -> usize {
        match self {
            Self::Transport { sent, .. } | Self::Cancelled { sent, .. } => *sent,
            Self::NothingToSend => 0,
        }
    }

    /// Whether some, but not all, parts reached the recipient.
    pub fn is_partial(&self) -> bool {
        self.sent() > 0
    }
}
