//! Reply relay — the inbound → generator → channel turn loop.
//!
//! For every inbound message the relay resolves the channel behavior,
//! derives the conversation's persistence id, locale and metadata, asks the
//! generator for a reply, and hands that reply to the behavior for delivery.
//!
//! [`ReplyRelay::run`] drives many conversations at once: each message gets
//! its own task, turns for different conversations run in parallel, and
//! turns for the same conversation are chained so they deliver in arrival
//! order.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use parlo_channels::{BehaviorRegistry, DeliveryReceipt, MessageSender, Metadata};
use parlo_core::bus::InboundMessage;
use parlo_core::config::Config;
use parlo_providers::{PromptContext, ResponseGenerator};

use crate::error::RelayError;

// ─────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────

/// Everything worth persisting about a completed turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    /// Storage-safe conversation id (hashed on privacy-sensitive channels).
    pub persistence_id: String,
    /// Locale tag resolved for the conversation.
    pub locale: String,
    /// Language the reply was requested in.
    pub language: String,
    /// Channel-specific metadata (masked where sensitive).
    pub metadata: Metadata,
    /// Receipt of the last message sent.
    pub receipt: DeliveryReceipt,
}

/// Totals reported by [`ReplyRelay::run`] once it stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub delivered: usize,
    pub failed: usize,
}

// ─────────────────────────────────────────────
// ReplyRelay
// ─────────────────────────────────────────────

/// Turns inbound messages into delivered replies.
pub struct ReplyRelay {
    /// Channel id → behavior.
    registry: BehaviorRegistry,
    /// Reply generator.
    generator: Arc<dyn ResponseGenerator>,
    /// Single-message sender, shared by all conversations.
    sender: Arc<dyn MessageSender>,
    /// System prompt for every turn.
    system_prompt: String,
    /// Ask the generator to reply in the conversation's language.
    language_hint: bool,
}

impl ReplyRelay {
    /// Create a relay with an explicit system prompt.
    pub fn new(
        registry: BehaviorRegistry,
        generator: Arc<dyn ResponseGenerator>,
        sender: Arc<dyn MessageSender>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            generator,
            sender,
            system_prompt: system_prompt.into(),
            language_hint: true,
        }
    }

    /// Create a relay using the prompt and hint settings from `config`.
    pub fn from_config(
        config: &Config,
        registry: BehaviorRegistry,
        generator: Arc<dyn ResponseGenerator>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self::new(registry, generator, sender, &config.generator.system_prompt)
            .with_language_hint(config.relay.language_hint)
    }

    /// Enable or disable the reply-language hint.
    pub fn with_language_hint(mut self, enabled: bool) -> Self {
        self.language_hint = enabled;
        self
    }

    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    /// Handle one turn: generate a reply for `inbound` and deliver it.
    ///
    /// Cancellation aborts generation outright and stops delivery between
    /// parts. A generation failure sends nothing.
    pub async fn handle(
        &self,
        inbound: &InboundMessage,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, RelayError> {
        let behavior = self.registry.resolve(&inbound.channel);
        let persistence_id = behavior.persistence_id(&inbound.address);
        let locale = behavior.resolve_locale(&inbound.address);
        let language = behavior.resolve_language(&inbound.address);
        let metadata = behavior.metadata(&inbound.address);

        info!(
            channel = %inbound.channel,
            behavior = behavior.name(),
            conversation = %persistence_id,
            locale = %locale,
            "handling turn"
        );

        let mut context = PromptContext::new(&self.system_prompt);
        if self.language_hint {
            context = context.with_language(&language);
        }

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RelayError::Cancelled),
            reply = self.generator.generate(&context, &inbound.content) => reply?,
        };
        debug!(
            conversation = %persistence_id,
            generator = self.generator.display_name(),
            reply_chars = reply.chars().count(),
            "reply generated"
        );

        let receipt = behavior
            .send_reply(&inbound.reply(reply), self.sender.as_ref(), cancel)
            .await?;

        info!(conversation = %persistence_id, receipt = %receipt.id, "reply delivered");

        Ok(TurnOutcome {
            persistence_id,
            locale,
            language,
            metadata,
            receipt,
        })
    }

    /// Consume `inbound` until it closes or `cancel` fires, then wait for
    /// in-flight turns to finish.
    ///
    /// Cancellation stops intake immediately and is passed on to every
    /// in-flight turn, which stops at its next part boundary.
    pub async fn run(
        self: Arc<Self>,
        mut inbound: mpsc::Receiver<InboundMessage>,
        cancel: CancellationToken,
    ) -> RunSummary {
        info!("relay started, waiting for messages");

        let mut tasks: JoinSet<bool> = JoinSet::new();
        // Completion signal of the latest turn per conversation.
        let mut tails: HashMap<String, oneshot::Receiver<()>> = HashMap::new();
        let mut summary = RunSummary::default();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("relay cancelled, no longer accepting messages");
                    break;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    record(&mut summary, joined);
                    tails.retain(|_, done| matches!(done.try_recv(), Err(oneshot::error::TryRecvError::Empty)));
                }
                msg = inbound.recv() => match msg {
                    Some(msg) => {
                        let key = msg.conversation_key();
                        let (done_tx, done_rx) = oneshot::channel();
                        let previous = tails.insert(key, done_rx);

                        let relay = self.clone();
                        let cancel = cancel.child_token();
                        tasks.spawn(async move {
                            if let Some(previous) = previous {
                                // Err means the earlier turn's task died; go ahead anyway.
                                let _ = previous.await;
                            }
                            let ok = relay.handle_logged(&msg, &cancel).await;
                            let _ = done_tx.send(());
                            ok
                        });
                    }
                    None => {
                        info!("inbound channel closed, relay draining");
                        break;
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            record(&mut summary, joined);
        }

        info!(
            delivered = summary.delivered,
            failed = summary.failed,
            "relay stopped"
        );
        summary
    }

    async fn handle_logged(&self, msg: &InboundMessage, cancel: &CancellationToken) -> bool {
        match self.handle(msg, cancel).await {
            Ok(_) => true,
            Err(e) => {
                let behavior = self.registry.resolve(&msg.channel);
                error!(
                    channel = %msg.channel,
                    conversation = %behavior.persistence_id(&msg.address),
                    parts_sent = e.parts_sent(),
                    partial = e.is_partial(),
                    retriable = e.is_retriable(),
                    error = %e,
                    "turn failed"
                );
                false
            }
        }
    }
}

fn record(summary: &mut RunSummary, joined: Result<bool, tokio::task::JoinError>) {
    match joined {
        Ok(true) => summary.delivered += 1,
        Ok(false) => summary.failed += 1,
        Err(e) => {
            warn!(error = %e, "turn task panicked");
            summary.failed += 1;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parlo_channels::{identity, DeliveryError, PhonePrefixTable};
    use parlo_core::config::ChannelsConfig;
    use parlo_providers::GeneratorError;
    use std::time::Duration;

    const WA_ADDRESS: &str = "whatsapp:+390331234567";

    /// Echoes the input back, optionally after a delay encoded in the text
    /// as `slow:<ms>:...`. Records the contexts it was called with.
    struct ScriptedGenerator {
        contexts: std::sync::Mutex<Vec<PromptContext>>,
        fail: bool,
    }

    impl ScriptedGenerator {
        fn new() -> Self {
            Self {
                contexts: std::sync::Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl ResponseGenerator for ScriptedGenerator {
        async fn generate(&self, context: &PromptContext, input: &str) -> Result<String, GeneratorError> {
            self.contexts.lock().unwrap().push(context.clone());
            if self.fail {
                return Err(GeneratorError::Api {
                    status: 500,
                    body: "down".into(),
                });
            }
            if let Some(rest) = input.strip_prefix("slow:") {
                let (ms, text) = rest.split_once(':').unwrap();
                tokio::time::sleep(Duration::from_millis(ms.parse().unwrap())).await;
                return Ok(text.to_string());
            }
            Ok(input.to_string())
        }

        fn display_name(&self) -> &str {
            "scripted"
        }
    }

    /// Records `(address, text)` of every send.
    struct RecordingSender {
        sent: tokio::sync::Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self {
                sent: tokio::sync::Mutex::new(Vec::new()),
                fail: false,
            }
        }

        async fn texts(&self) -> Vec<String> {
            self.sent.lock().await.iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, address: &str, text: &str) -> anyhow::Result<DeliveryReceipt> {
            if self.fail {
                anyhow::bail!("provider unavailable");
            }
            let mut sent = self.sent.lock().await;
            sent.push((address.to_string(), text.to_string()));
            Ok(DeliveryReceipt::new(format!("SM{}", sent.len())))
        }
    }

    fn registry() -> BehaviorRegistry {
        BehaviorRegistry::from_config(&ChannelsConfig::default(), Arc::new(PhonePrefixTable::default()))
    }

    fn relay(generator: Arc<ScriptedGenerator>, sender: Arc<RecordingSender>) -> ReplyRelay {
        ReplyRelay::new(registry(), generator, sender, "Be helpful.")
    }

    #[tokio::test]
    async fn test_whatsapp_turn() {
        let generator = Arc::new(ScriptedGenerator::new());
        let sender = Arc::new(RecordingSender::new());
        let relay = relay(generator.clone(), sender.clone());

        let inbound = InboundMessage::new("whatsapp", WA_ADDRESS, "**Ciao**");
        let outcome = relay.handle(&inbound, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.persistence_id, identity::hash_address(WA_ADDRESS));
        assert_eq!(outcome.locale, "it-IT");
        assert_eq!(outcome.language, "Italian");
        assert_eq!(outcome.metadata["mobile"].as_deref(), Some("+390*567"));
        assert_eq!(outcome.receipt.id, "SM1");

        let sent = sender.sent.lock().await;
        assert_eq!(sent[0], (WA_ADDRESS.to_string(), "*Ciao*".to_string()));

        let contexts = generator.contexts.lock().unwrap();
        assert_eq!(contexts[0].language.as_deref(), Some("Italian"));
        assert_eq!(contexts[0].system_prompt, "Be helpful.");
    }

    #[tokio::test]
    async fn test_default_channel_turn() {
        let generator = Arc::new(ScriptedGenerator::new());
        let sender = Arc::new(RecordingSender::new());
        let relay = relay(generator.clone(), sender.clone()).with_language_hint(false);

        let inbound = InboundMessage::new("webchat", "conv-42", "**kept**");
        let outcome = relay.handle(&inbound, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.persistence_id, "conv-42");
        assert_eq!(outcome.locale, "en-US");
        assert!(outcome.metadata.is_empty());
        assert_eq!(sender.texts().await, vec!["**kept**"]);
        assert_eq!(generator.contexts.lock().unwrap()[0].language, None);
    }

    #[tokio::test]
    async fn test_generation_failure_sends_nothing() {
        let sender = Arc::new(RecordingSender::new());
        let relay = relay(Arc::new(ScriptedGenerator::failing()), sender.clone());

        let err = relay
            .handle(&InboundMessage::new("whatsapp", WA_ADDRESS, "hi"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Generation(_)));
        assert!(sender.texts().await.is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let sender = Arc::new(RecordingSender {
            fail: true,
            ..RecordingSender::new()
        });
        let relay = relay(Arc::new(ScriptedGenerator::new()), sender);

        let err = relay
            .handle(&InboundMessage::new("whatsapp", WA_ADDRESS, "hi"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RelayError::Delivery(DeliveryError::Transport { sent: 0, total: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_generation() {
        let sender = Arc::new(RecordingSender::new());
        let relay = relay(Arc::new(ScriptedGenerator::new()), sender.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = relay
            .handle(&InboundMessage::new("whatsapp", WA_ADDRESS, "hi"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Cancelled));
        assert!(sender.texts().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_orders_same_conversation() {
        let sender = Arc::new(RecordingSender::new());
        let relay = Arc::new(relay(Arc::new(ScriptedGenerator::new()), sender.clone()));

        let (tx, rx) = mpsc::channel(8);
        tx.send(InboundMessage::new("whatsapp", WA_ADDRESS, "slow:500:first"))
            .await
            .unwrap();
        tx.send(InboundMessage::new("whatsapp", WA_ADDRESS, "second"))
            .await
            .unwrap();
        drop(tx);

        let summary = relay.run(rx, CancellationToken::new()).await;

        assert_eq!(summary, RunSummary { delivered: 2, failed: 0 });
        assert_eq!(sender.texts().await, vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_parallel_across_conversations() {
        let sender = Arc::new(RecordingSender::new());
        let relay = Arc::new(relay(Arc::new(ScriptedGenerator::new()), sender.clone()));

        let (tx, rx) = mpsc::channel(8);
        tx.send(InboundMessage::new("whatsapp", WA_ADDRESS, "slow:500:slow one"))
            .await
            .unwrap();
        tx.send(InboundMessage::new("whatsapp", "whatsapp:+447700900123", "fast one"))
            .await
            .unwrap();
        drop(tx);

        relay.run(rx, CancellationToken::new()).await;

        assert_eq!(sender.texts().await, vec!["fast one", "slow one"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_counts_failures() {
        let sender = Arc::new(RecordingSender::new());
        let relay = Arc::new(relay(Arc::new(ScriptedGenerator::failing()), sender));

        let (tx, rx) = mpsc::channel(8);
        tx.send(InboundMessage::new("webchat", "a", "x")).await.unwrap();
        tx.send(InboundMessage::new("webchat", "b", "y")).await.unwrap();
        drop(tx);

        let summary = relay.run(rx, CancellationToken::new()).await;
        assert_eq!(summary, RunSummary { delivered: 0, failed: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cancel_stops_in_flight_turns() {
        let sender = Arc::new(RecordingSender::new());
        let relay = Arc::new(relay(Arc::new(ScriptedGenerator::new()), sender.clone()));
        let cancel = CancellationToken::new();

        let (tx, rx) = mpsc::channel(8);
        tx.send(InboundMessage::new("whatsapp", WA_ADDRESS, "slow:10000:late"))
            .await
            .unwrap();

        let handle = tokio::spawn(relay.run(rx, cancel.clone()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let summary = handle.await.unwrap();
        assert_eq!(summary, RunSummary { delivered: 0, failed: 1 });
        assert!(sender.texts().await.is_empty());
        drop(tx);
    }
}
