//! Bus event types — messages flowing between the transport and the relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inbound text event for a conversation.
///
/// Produced by whatever transport receives provider webhooks; the relay only
/// ever reads it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Channel identifier (e.g. "whatsapp", "twilio-sms", "cli").
    pub channel: String,
    /// Conversation address (e.g. "whatsapp:+390331234567").
    pub address: String,
    /// Text content of the message.
    pub content: String,
    /// When the message was received.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Create a new inbound message stamped with the current time.
    pub fn new(
        channel: impl Into<String>,
        address: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        InboundMessage {
            channel: channel.into(),
            address: address.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Key combining channel and address (e.g. "whatsapp:whatsapp:+39...").
    ///
    /// Turns sharing a key are delivered one after another.
    pub fn conversation_key(&self) -> String {
        format!("{}:{}", self.channel, self.address)
    }

    /// Build the reply for this conversation.
    pub fn reply(&self, content: impl Into<String>) -> OutboundMessage {
        OutboundMessage::new(&self.channel, &self.address, content)
    }
}

/// A reply on its way out to a conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundMessage {
    /// Target channel identifier.
    pub channel: String,
    /// Target conversation address.
    pub address: String,
    /// Raw reply text, before any channel formatting.
    pub content: String,
}

impl OutboundMessage {
    /// Create a new outbound message.
    pub fn new(
        channel: impl Into<String>,
        address: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        OutboundMessage {
            channel: channel.into(),
            address: address.into(),
            content: content.into(),
        }
    }
}
