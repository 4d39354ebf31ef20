//! Console stand-ins for the provider integrations.
//!
//! `ConsoleSender` prints each outbound part instead of calling a messaging
//! API; `EchoGenerator` answers with the inbound text so the pipeline can be
//! exercised offline.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use parlo_channels::{DeliveryReceipt, MessageSender};
use parlo_providers::{GeneratorError, PromptContext, ResponseGenerator};

use crate::helpers;

/// Prints every part it is asked to send.
#[derive(Debug, Default)]
pub struct ConsoleSender {
    sent: AtomicUsize,
}

impl ConsoleSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send(&self, address: &str, text: &str) -> anyhow::Result<DeliveryReceipt> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        helpers::print_part(n, address, text);
        Ok(DeliveryReceipt::new(format!("console-{n}")))
    }
}

/// Replies with the inbound text unchanged.
#[derive(Debug, Default)]
pub struct EchoGenerator;

#[async_trait]
impl ResponseGenerator for EchoGenerator {
    async fn generate(&self, _context: &PromptContext, input: &str) -> Result<String, GeneratorError> {
        if input.trim().is_empty() {
            return Err(GeneratorError::EmptyReply);
        }
        Ok(input.to_string())
    }

    fn display_name(&self) -> &str {
        "echo"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_sender_numbers_receipts() {
        let sender = ConsoleSender::new();
        let first = sender.send("addr", "one").await.unwrap();
        let second = sender.send("addr", "two").await.unwrap();
        assert_eq!(first.id, "console-1");
        assert_eq!(second.id, "console-2");
        assert_eq!(sender.sent(), 2);
    }

    #[tokio::test]
    async fn echo_generator_returns_input() {
        let reply = EchoGenerator
            .generate(&PromptContext::default(), "hello")
            .await
            .unwrap();
        assert_eq!(reply, "hello");
    }

    #[tokio::test]
    async fn echo_generator_rejects_blank_input() {
        let err = EchoGenerator
            .generate(&PromptContext::default(), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyReply));
    }
}
