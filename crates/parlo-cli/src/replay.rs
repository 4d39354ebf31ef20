//! `parlo replay` — push a file of inbound events through the relay loop.
//!
//! The file holds one JSON `InboundMessage` per line:
//!
//! ```text
//! {"channel":"whatsapp","address":"whatsapp:+390331234567","content":"Ciao"}
//! ```
//!
//! Events are queued in file order and handled concurrently, one ordered
//! lane per conversation. Ctrl+C stops intake and cancels in-flight replies.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use parlo_agent::ReplyRelay;
use parlo_core::bus::InboundMessage;

/// A line that could not be parsed.
#[derive(Debug, PartialEq)]
pub struct BadLine {
    pub line: usize,
    pub error: String,
}

/// Parse JSON-lines events. Blank lines and `#` comments are skipped.
pub fn parse_events(text: &str) -> (Vec<InboundMessage>, Vec<BadLine>) {
    let mut events = Vec::new();
    let mut bad = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<InboundMessage>(line) {
            Ok(event) => events.push(event),
            Err(e) => bad.push(BadLine {
                line: idx + 1,
                error: e.to_string(),
            }),
        }
    }

    (events, bad)
}

/// Run the replay command.
pub async fn run(relay: Arc<ReplyRelay>, path: &Path, capacity: usize) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let (events, bad) = parse_events(&text);
    for b in &bad {
        warn!(line = b.line, error = %b.error, "skipping malformed event");
    }
    info!(events = events.len(), skipped = bad.len(), "replaying events");

    let (tx, rx) = mpsc::channel(capacity.max(1));
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received Ctrl+C, cancelling replay");
                cancel.cancel();
            }
        });
    }

    let producer = tokio::spawn(async move {
        for event in events {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let summary = relay.run(rx, cancel).await;
    producer.abort();

    println!();
    println!(
        "{} {} delivered, {} failed, {} skipped",
        "Replay:".bold(),
        summary.delivered.to_string().green(),
        summary.failed.to_string().red(),
        bad.len()
    );

    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_events_skips_blank_and_comments() {
        let text = r#"
# morning traffic
{"channel":"whatsapp","address":"whatsapp:+390331234567","content":"Ciao"}

{"channel":"webchat","address":"conv-1","content":"Hello","timestamp":"2024-05-01T10:00:00Z"}
"#;
        let (events, bad) = parse_events(text);
        assert!(bad.is_empty());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].channel, "whatsapp");
        assert_eq!(events[1].address, "conv-1");
    }

    #[test]
    fn parse_events_reports_bad_lines() {
        let text = "{\"channel\":\"whatsapp\",\"address\":\"a\",\"content\":\"ok\"}\nnot json\n{\"channel\":\"x\"}";
        let (events, bad) = parse_events(text);
        assert_eq!(events.len(), 1);
        assert_eq!(bad.len(), 2);
        assert_eq!(bad[0].line, 2);
        assert_eq!(bad[1].line, 3);
    }

    #[tokio::test]
    async fn replay_file_through_echo_relay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(
            &path,
            "{\"channel\":\"whatsapp\",\"address\":\"whatsapp:+390331234567\",\"content\":\"one\"}\n\
             {\"channel\":\"webchat\",\"address\":\"conv-1\",\"content\":\"two\"}\n",
        )
        .unwrap();

        let relay = crate::build_relay(&parlo_core::config::Config::default(), true).unwrap();
        run(Arc::new(relay), &path, 4).await.unwrap();
    }

    #[tokio::test]
    async fn replay_missing_file_errors() {
        let relay = crate::build_relay(&parlo_core::config::Config::default(), true).unwrap();
        let err = run(Arc::new(relay), Path::new("/nonexistent/events.jsonl"), 4)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
