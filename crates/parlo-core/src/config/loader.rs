//! Config loader — reads `~/.parlo/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.parlo/config.json`
//! 3. Environment variables `PARLO_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{BehaviorConfig, Config};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `PARLO_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `PARLO_GENERATOR__API_KEY` → `generator.api_key`
/// - `PARLO_GENERATOR__API_BASE` → `generator.api_base`
/// - `PARLO_GENERATOR__MODEL` → `generator.model`
/// - `PARLO_CHANNELS__<VARIANT>__MAX_LENGTH` → `channels.<variant>.max_length`
/// - `PARLO_CHANNELS__<VARIANT>__PACING_MS` → `channels.<variant>.pacing_ms`
/// - `PARLO_CHANNELS__<VARIANT>__REQUIRES_STREAMING` → `channels.<variant>.requires_streaming`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("PARLO_GENERATOR__API_KEY") {
        config.generator.api_key = val;
    }
    if let Ok(val) = std::env::var("PARLO_GENERATOR__API_BASE") {
        config.generator.api_base = val;
    }
    if let Ok(val) = std::env::var("PARLO_GENERATOR__MODEL") {
        config.generator.model = val;
    }

    apply_behavior_env(&mut config.channels.default, "DEFAULT");
    apply_behavior_env(&mut config.channels.whatsapp, "WHATSAPP");

    config
}

/// Apply env var overrides for a single channel variant.
fn apply_behavior_env(behavior: &mut BehaviorConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("PARLO_CHANNELS__{name}__MAX_LENGTH")) {
        match val.parse::<usize>() {
            Ok(n) if n > 0 => behavior.max_length = n,
            _ => warn!(variant = name, value = %val, "ignoring invalid max length override"),
        }
    }
    if let Ok(val) = std::env::var(format!("PARLO_CHANNELS__{name}__PACING_MS")) {
        if let Ok(ms) = val.parse::<u64>() {
            behavior.pacing_ms = ms;
        }
    }
    if let Ok(val) = std::env::var(format!("PARLO_CHANNELS__{name}__REQUIRES_STREAMING")) {
        behavior.requires_streaming = val == "true" || val == "1";
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
