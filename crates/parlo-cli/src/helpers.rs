//! Shared CLI helpers — path expansion, output formatting, banner.

use std::path::PathBuf;

use colored::Colorize;

use parlo_channels::{DeliveryReceipt, Metadata, SegmentPlan};

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print one outbound part as the recipient would get it.
pub fn print_part(n: usize, address: &str, text: &str) {
    println!();
    println!(
        "{} {}",
        format!("── part {n} ──").cyan().bold(),
        format!("→ {address} ({} chars)", text.chars().count()).dimmed()
    );
    if text.is_empty() {
        println!("{}", "(empty)".dimmed());
    } else {
        println!("{text}");
    }
}

/// Print how a reply is going to be split.
pub fn print_plan(behavior: &str, plan: &SegmentPlan) {
    println!(
        "{} {} part(s), {:?} ({} behavior)",
        "Plan:".bold(),
        plan.len(),
        plan.strategy,
        behavior
    );
}

/// Print the receipt of the last part sent.
pub fn print_receipt(receipt: &DeliveryReceipt) {
    println!();
    println!("{} {}", "✓ delivered, last receipt:".green(), receipt.id);
}

/// Print what a behavior derives from an address.
pub fn print_inspection(behavior: &str, persistence_id: &str, locale: &str, language: &str, metadata: &Metadata) {
    println!();
    println!("  {:<18} {}", "Behavior:".bold(), behavior);
    println!("  {:<18} {}", "Persistence id:".bold(), persistence_id);
    println!("  {:<18} {}", "Locale:".bold(), locale);
    println!("  {:<18} {}", "Language:".bold(), language);
    if metadata.is_empty() {
        println!("  {:<18} {}", "Metadata:".bold(), "(none)".dimmed());
    } else {
        println!("  {}", "Metadata:".bold());
        for (key, value) in metadata {
            println!("    {:<16} {}", key, format_value(value.as_deref()));
        }
    }
    println!();
}

fn format_value(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "(unavailable)".dimmed().to_string(),
    }
}

/// Print the banner shown at REPL start.
pub fn print_banner(channel: &str, address: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Parlo".cyan().bold(), version.dimmed());
    println!("{}", format!("channel {channel}, address {address}").dimmed());
    println!("{}", "Type a message, or \"exit\" to quit.".dimmed());
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
