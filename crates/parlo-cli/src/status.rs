//! `parlo status` — show configuration and channel behaviors.

use anyhow::Result;
use colored::Colorize;

use parlo_channels::ChannelBehavior;
use parlo_core::config::{get_config_path, load_config};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "Parlo Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    // Generator
    let generator = &config.generator;
    println!("  {:<18} {}", "Generator:".bold(), generator.api_base);
    println!("  {:<18} {}", "Model:".bold(), generator.model);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", generator.temperature).dimmed(),
        format!("{}", generator.max_tokens).dimmed(),
    );
    let key_status = if generator.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    // Behaviors
    let registry = crate::build_registry(&config);
    println!();
    println!("  {}", "Channels:".bold());
    for (channel, behavior) in registry.channels() {
        println!("    {:<20} {}", channel, describe(registry.resolve(&channel), behavior));
    }
    println!(
        "    {:<20} {}",
        "(any other)".dimmed(),
        describe(registry.fallback(), registry.fallback().name())
    );

    // Locale
    println!();
    println!(
        "  {:<18} {} / {} {}",
        "Locale default:".bold(),
        config.locale.default_locale,
        config.locale.default_language,
        format!("(marker \"{}\")", config.locale.address_prefix).dimmed()
    );
    println!(
        "  {:<18} language hint {}",
        "Relay:".bold(),
        if config.relay.language_hint { "on" } else { "off" }
    );

    println!();

    Ok(())
}

fn describe(behavior: &ChannelBehavior, name: &str) -> String {
    let policy = behavior.policy();
    if policy.requires_streaming {
        format!(
            "{name}: segmented at {} chars, {} ms pacing",
            policy.max_length,
            policy.pacing.as_millis()
        )
    } else {
        format!("{name}: single message")
    }
}
