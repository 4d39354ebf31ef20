//! Sender trait: the provider integration that delivers one message.
//!
//! Everything above this trait (formatting, segmentation, pacing) is owned
//! by the relay. Implementations only know how to push a single text to an
//! address and report the identifier the provider assigned to it.

use async_trait::async_trait;

/// Provider identifier for one delivered message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: String,
}

impl DeliveryReceipt {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Delivers a single message to a conversation.
///
/// Shared across conversations as `Arc<dyn MessageSender>`, so
/// implementations must be safe to call concurrently. Retrying is the
/// implementation's business; the relay never retries a failed send.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` to `address` and return the provider's receipt.
    async fn send(&self, address: &str, text: &str) -> anyhow::Result<DeliveryReceipt>;
}
