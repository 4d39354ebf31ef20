//! Delivery sequencer.
//!
//! Pushes the parts of one reply through a [`MessageSender`] strictly in
//! order, one at a time, with an optional pause between parts. The pause is
//! a cancellable `tokio` sleep, so a long multi-part reply never holds a
//! worker thread and stops promptly on shutdown.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::base::{DeliveryReceipt, MessageSender};
use crate::error::DeliveryError;

/// Send `parts` to `address` in order and return the receipt of the last one.
///
/// When `pacing` is set, the sequencer waits that long between consecutive
/// sends (never before the first or after the last). Cancellation is checked
/// before each send and during each wait; a send already in flight is
/// allowed to finish.
pub async fn deliver(
    address: &str,
    parts: &[String],
    sender: &dyn MessageSender,
    pacing: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<DeliveryReceipt, DeliveryError> {
    let total = parts.len();
    let mut last = None;

    for (sent, part) in parts.iter().enumerate() {
        if sent > 0 {
            if let Some(delay) = pacing {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!(sent, total, "delivery cancelled during pacing");
                        return Err(DeliveryError::Cancelled { sent, total });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        if cancel.is_cancelled() {
            debug!(sent, total, "delivery cancelled");
            return Err(DeliveryError::Cancelled { sent, total });
        }

        match sender.send(address, part).await {
            Ok(receipt) => {
                debug!(part = sent + 1, total, chars = part.chars().count(), id = %receipt.id, "part sent");
                last = Some(receipt);
            }
            Err(e) => {
                warn!(sent, total, error = %e, "part send failed, aborting reply");
                return Err(DeliveryError::Transport {
                    sent,
                    total,
                    source: e,
                });
            }
        }
    }

    last.ok_or(DeliveryError::NothingToSend)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::time::Instant;

    /// Records each send with the (virtual) time it happened. Fails on the
    /// call numbered `fail_on`, if set.
    struct ScriptedSender {
        log: tokio::sync::Mutex<Vec<(String, Instant)>>,
        fail_on: Option<usize>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl ScriptedSender {
        fn new() -> Self {
            Self {
                log: tokio::sync::Mutex::new(Vec::new()),
                fail_on: None,
                cancel_after: None,
            }
        }

        async fn texts(&self) -> Vec<String> {
            self.log.lock().await.iter().map(|(t, _)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl MessageSender for ScriptedSender {
        async fn send(&self, _address: &str, text: &str) -> anyhow::Result<DeliveryReceipt> {
            let mut log = self.log.lock().await;
            let n = log.len() + 1;
            if self.fail_on == Some(n) {
                anyhow::bail!("provider rejected part {n}");
            }
            log.push((text.to_string(), Instant::now()));
            if let Some((after, token)) = &self.cancel_after {
                if *after == n {
                    token.cancel();
                }
            }
            Ok(DeliveryReceipt::new(format!("SM{n}")))
        }
    }

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sends_in_order_and_returns_last_receipt() {
        let sender = ScriptedSender::new();
        let receipt = deliver(
            "addr",
            &parts(&["one", "two", "three"]),
            &sender,
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(receipt.id, "SM3");
        assert_eq!(sender.texts().await, vec!["one", "two", "three"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_sends_only() {
        let sender = ScriptedSender::new();
        let start = Instant::now();
        let delay = Duration::from_secs(1);

        deliver("addr", &parts(&["a", "b", "c"]), &sender, Some(delay), &CancellationToken::new())
            .await
            .unwrap();

        let log = sender.log.lock().await;
        assert_eq!(log[0].1 - start, Duration::ZERO);
        assert_eq!(log[1].1 - log[0].1, delay);
        assert_eq!(log[2].1 - log[1].1, delay);
        assert_eq!(start.elapsed(), delay * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_pacing_means_back_to_back() {
        let sender = ScriptedSender::new();
        let start = Instant::now();

        deliver("addr", &parts(&["a", "b"]), &sender, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_failure_aborts_with_sent_count() {
        let sender = ScriptedSender {
            fail_on: Some(2),
            ..ScriptedSender::new()
        };

        let err = deliver("addr", &parts(&["a", "b", "c"]), &sender, None, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            DeliveryError::Transport { sent, total, source } => {
                assert_eq!(sent, 1);
                assert_eq!(total, 3);
                assert!(source.to_string().contains("part 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sender.texts().await, vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_pacing_stops_remaining_parts() {
        let token = CancellationToken::new();
        let sender = ScriptedSender {
            cancel_after: Some((1, token.clone())),
            ..ScriptedSender::new()
        };

        let err = deliver(
            "addr",
            &parts(&["a", "b", "c"]),
            &sender,
            Some(Duration::from_secs(1)),
            &token,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DeliveryError::Cancelled { sent: 1, total: 3 }));
        assert_eq!(sender.texts().await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_cancel_without_pacing_checked_before_send() {
        let token = CancellationToken::new();
        let sender = ScriptedSender {
            cancel_after: Some((2, token.clone())),
            ..ScriptedSender::new()
        };

        let err = deliver("addr", &parts(&["a", "b", "c"]), &sender, None, &token)
            .await
            .unwrap_err();

        assert_eq!(err.sent(), 2);
        assert_eq!(sender.texts().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_already_cancelled_sends_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let sender = ScriptedSender::new();

        let err = deliver("addr", &parts(&["a"]), &sender, None, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::Cancelled { sent: 0, total: 1 }));
        assert!(sender.texts().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_parts_is_an_error() {
        let sender = ScriptedSender::new();
        let err = deliver("addr", &[], &sender, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::NothingToSend));
    }

    #[tokio::test(start_paused = true)]
    async fn test_works_through_shared_trait_object() {
        let sender: Arc<dyn MessageSender> = Arc::new(ScriptedSender::new());
        let receipt = deliver(
            "addr",
            &parts(&["x", "y"]),
            sender.as_ref(),
            Some(Duration::from_millis(250)),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(receipt.id, "SM2");
    }
}
