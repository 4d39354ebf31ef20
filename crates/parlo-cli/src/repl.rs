//! Interactive REPL — each line becomes an inbound message for the relay.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use parlo_agent::ReplyRelay;
use parlo_core::bus::InboundMessage;
use parlo_core::utils::truncate_string;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Run the interactive REPL loop.
pub async fn run(relay: ReplyRelay, channel: &str, address: &str) -> Result<()> {
    helpers::print_banner(channel, address);

    let mut editor = create_editor()?;
    let cancel = CancellationToken::new();

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        debug!(channel = channel, input_len = trimmed.len(), "processing input");

        let inbound = InboundMessage::new(channel, address, trimmed);
        match relay.handle(&inbound, &cancel).await {
            Ok(outcome) => {
                println!();
                println!(
                    "{}",
                    format!(
                        "[{} · {} · {}]",
                        outcome.locale,
                        outcome.language,
                        truncate_string(&outcome.persistence_id, 15)
                    )
                    .dimmed()
                );
                println!();
            }
            Err(e) => {
                eprintln!("\nError: {e}");
                if e.is_partial() {
                    eprintln!("{}", format!("({} part(s) were delivered)", e.parts_sent()).dimmed());
                }
                eprintln!();
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    parlo_core::utils::get_data_path().join("history").join("chat_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
