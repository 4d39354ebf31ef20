//! Configuration schema.
//!
//! Hierarchy: `Config` → `GeneratorConfig`, `ChannelsConfig`, `LocaleConfig`,
//! `RelayConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.parlo/config.json` + env vars.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub channels: ChannelsConfig,
    pub locale: LocaleConfig,
    pub relay: RelayConfig,
}

// ─────────────────────────────────────────────
// Generator
// ─────────────────────────────────────────────

/// Default system prompt sent ahead of every inbound message.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a customer service assistant who helps \
resolve customer queries over a messaging channel. Keep a professional and friendly tone. \
If you do not know the answer, say so and suggest contacting customer service.";

/// Response generator settings (any OpenAI-compatible chat completions API).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    pub api_base: String,
    /// API key for Bearer authentication.
    pub api_key: String,
    /// Model or deployment name.
    pub model: String,
    /// System prompt prepended to every request.
    pub system_prompt: String,
    /// Maximum tokens to generate per reply.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// Whether an API key has been configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────

/// Per-variant delivery policy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorConfig {
    /// Channel identifiers that select this variant.
    pub channel_ids: Vec<String>,
    /// Whether long replies are segmented and sent as several messages.
    /// When false, replies go out as one message whatever their length.
    pub requires_streaming: bool,
    /// Maximum characters per outbound message.
    pub max_length: usize,
    /// Delay between consecutive list-item parts, in milliseconds.
    pub pacing_ms: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            channel_ids: Vec::new(),
            requires_streaming: false,
            max_length: 50_000,
            pacing_ms: 1_000,
        }
    }
}

/// All channel variant configurations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelsConfig {
    /// Fallback variant for any channel without a dedicated behavior.
    pub default: BehaviorConfig,
    /// Privacy-sensitive WhatsApp variant.
    pub whatsapp: BehaviorConfig,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            default: BehaviorConfig::default(),
            whatsapp: BehaviorConfig {
                channel_ids: vec!["whatsapp".to_string(), "twilio-sms".to_string()],
                requires_streaming: true,
                ..BehaviorConfig::default()
            },
        }
    }
}

// ─────────────────────────────────────────────
// Locale
// ─────────────────────────────────────────────

/// Phone-prefix locale resolution settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocaleConfig {
    /// Marker preceding the embedded phone number in an address.
    pub address_prefix: String,
    /// Locale returned when no prefix matches.
    pub default_locale: String,
    /// Language returned when no prefix matches.
    pub default_language: String,
    /// Extra prefix → locale entries, merged over the built-in table.
    pub extra_locales: HashMap<String, String>,
    /// Extra prefix → language entries, merged over the built-in table.
    pub extra_languages: HashMap<String, String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            address_prefix: "whatsapp:".to_string(),
            default_locale: "en-US".to_string(),
            default_language: "English".to_string(),
            extra_locales: HashMap::new(),
            extra_languages: HashMap::new(),
        }
    }
}

// ─────────────────────────────────────────────
// Relay
// ─────────────────────────────────────────────

/// Turn relay settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    /// Buffer size of the inbound queue.
    pub inbound_capacity: usize,
    /// Ask the generator to answer in the language resolved from the address.
    pub language_hint: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 100,
            language_hint: true,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
