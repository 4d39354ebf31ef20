//! `parlo init` — write the default configuration.
//!
//! - Creates `~/.parlo/config.json` with defaults (kept unless `--force`)
//! - Creates `~/.parlo/history/` for the chat REPL

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use parlo_core::config::{save_config, Config};
use parlo_core::utils::get_data_path;

/// What `init` did to the config file.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigAction {
    Created,
    Overwritten,
    Kept,
}

/// Run the init command.
pub fn run(force: bool) -> Result<()> {
    println!();
    println!("{}", "Parlo — Setup".cyan().bold());
    println!();

    let data_dir = get_data_path();
    let action = init_at(&data_dir, force)?;
    let config_path = data_dir.join("config.json");

    let verb = match action {
        ConfigAction::Created => "created config at",
        ConfigAction::Overwritten => "overwrote config at",
        ConfigAction::Kept => "config already exists at",
    };
    println!("  {} {} {}", "✓".green(), verb, config_path.display());
    println!("  {} history dir at {}", "✓".green(), data_dir.join("history").display());

    println!();
    println!(
        "{}",
        "  Setup complete! Set generator.apiKey, then run `parlo chat`.".green()
    );
    println!();

    Ok(())
}

/// Write defaults into `data_dir`. Environment overrides are not persisted.
pub fn init_at(data_dir: &Path, force: bool) -> Result<ConfigAction> {
    let config_path = data_dir.join("config.json");
    let existed = config_path.exists();

    let action = if existed && !force {
        ConfigAction::Kept
    } else {
        save_config(&Config::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        if existed {
            ConfigAction::Overwritten
        } else {
            ConfigAction::Created
        }
    };

    let history_dir = data_dir.join("history");
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;

    Ok(action)
}
