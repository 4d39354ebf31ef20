//! Parlo CLI — entry point.
//!
//! # Commands
//!
//! - `parlo chat [-c CHANNEL] [-a ADDRESS] [--echo]` — interactive REPL
//! - `parlo send (-m TEXT | -f FILE)` — run a reply through the outbound pipeline only
//! - `parlo inspect ADDRESS` — locale, persistence id and metadata for an address
//! - `parlo replay FILE` — feed JSON-lines inbound events through the relay
//! - `parlo status` — show configuration
//! - `parlo init` — write the default configuration

mod console;
mod helpers;
mod init;
mod replay;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use parlo_agent::ReplyRelay;
use parlo_channels::{BehaviorRegistry, PhonePrefixTable};
use parlo_core::bus::OutboundMessage;
use parlo_core::config::{load_config, Config};
use parlo_providers::{HttpGenerator, ResponseGenerator};

use crate::console::{ConsoleSender, EchoGenerator};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parlo — messaging reply relay
#[derive(Parser)]
#[command(name = "parlo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat through the relay; every line is an inbound message
    Chat {
        /// Channel the conversation arrives on
        #[arg(short, long, default_value = "whatsapp")]
        channel: String,

        /// Conversation address
        #[arg(short, long, default_value = "whatsapp:+15550000000")]
        address: String,

        /// Echo input back instead of calling the generator
        #[arg(long, default_value_t = false)]
        echo: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Format, segment and deliver a reply to the console
    Send {
        /// Channel whose behavior is applied
        #[arg(short, long, default_value = "whatsapp")]
        channel: String,

        /// Conversation address
        #[arg(short, long, default_value = "whatsapp:+15550000000")]
        address: String,

        /// Reply text
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        message: Option<String>,

        /// Read the reply text from a file
        #[arg(short, long)]
        file: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show what a channel derives from an address
    Inspect {
        /// Conversation address (e.g. "whatsapp:+390331234567")
        address: String,

        /// Channel whose behavior is applied
        #[arg(short, long, default_value = "whatsapp")]
        channel: String,
    },

    /// Feed a JSON-lines file of inbound events through the relay
    Replay {
        /// Path to the events file
        file: String,

        /// Echo input back instead of calling the generator
        #[arg(long, default_value_t = false)]
        echo: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration status
    Status,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            channel,
            address,
            echo,
            logs,
        } => {
            init_logging(logs);
            let config = load_config(None);
            let relay = build_relay(&config, echo)?;
            repl::run(relay, &channel, &address).await
        }
        Commands::Send {
            channel,
            address,
            message,
            file,
            logs,
        } => {
            init_logging(logs);
            let text = match (message, file) {
                (Some(text), _) => text,
                (None, Some(path)) => {
                    let path = helpers::expand_tilde(&path);
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?
                }
                (None, None) => bail!("either --message or --file is required"),
            };
            run_send(&load_config(None), &channel, &address, text).await
        }
        Commands::Inspect { address, channel } => {
            init_logging(false);
            run_inspect(&load_config(None), &channel, &address);
            Ok(())
        }
        Commands::Replay { file, echo, logs } => {
            init_logging(logs);
            let config = load_config(None);
            let relay = build_relay(&config, echo)?;
            replay::run(Arc::new(relay), &helpers::expand_tilde(&file), config.relay.inbound_capacity).await
        }
        Commands::Status => status::run(),
        Commands::Init { force } => init::run(force),
    }
}

// ─────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────

/// Build the behavior registry around a shared locale table.
pub fn build_registry(config: &Config) -> BehaviorRegistry {
    let table = Arc::new(PhonePrefixTable::from_config(&config.locale));
    BehaviorRegistry::from_config(&config.channels, table)
}

/// Pick the generator: the configured HTTP API, or the offline echo.
pub fn build_generator(config: &Config, echo: bool) -> Result<Arc<dyn ResponseGenerator>> {
    if echo {
        return Ok(Arc::new(EchoGenerator));
    }
    if !config.generator.is_configured() {
        info!(api_base = %config.generator.api_base, "no API key configured, sending unauthenticated requests");
    }
    let generator = HttpGenerator::new(&config.generator).context("invalid generator configuration")?;
    Ok(Arc::new(generator))
}

/// Build a relay that prints replies to the console.
pub fn build_relay(config: &Config, echo: bool) -> Result<ReplyRelay> {
    let generator = build_generator(config, echo)?;
    Ok(ReplyRelay::from_config(
        config,
        build_registry(config),
        generator,
        Arc::new(ConsoleSender::new()),
    ))
}

// ─────────────────────────────────────────────
// send / inspect
// ─────────────────────────────────────────────

async fn run_send(config: &Config, channel: &str, address: &str, text: String) -> Result<()> {
    let registry = build_registry(config);
    let behavior = registry.resolve(channel);
    let plan = behavior.plan_reply(&text);
    helpers::print_plan(behavior.name(), &plan);

    let sender = ConsoleSender::new();
    let reply = OutboundMessage::new(channel, address, text);
    let receipt = behavior
        .send_reply(&reply, &sender, &CancellationToken::new())
        .await
        .context("delivery failed")?;

    helpers::print_receipt(&receipt);
    Ok(())
}

fn run_inspect(config: &Config, channel: &str, address: &str) {
    let registry = build_registry(config);
    let behavior = registry.resolve(channel);
    helpers::print_inspection(
        behavior.name(),
        &behavior.persistence_id(address),
        &behavior.resolve_locale(address),
        &behavior.resolve_language(address),
        &behavior.metadata(address),
    );
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("parlo=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
