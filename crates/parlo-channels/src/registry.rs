//! Behavior registry — picks the channel variant for a conversation.
//!
//! Built once from [`ChannelsConfig`] at start-up. Every channel id listed
//! under a dedicated variant maps to that variant; any other id resolves to
//! the default variant.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use parlo_core::config::ChannelsConfig;

use crate::behavior::{Capabilities, ChannelBehavior, DeliveryPolicy};
use crate::locale::PhonePrefixTable;

// ─────────────────────────────────────────────
// BehaviorRegistry
// ─────────────────────────────────────────────

/// Channel id → behavior, with a default for unknown channels.
#[derive(Clone, Debug)]
pub struct BehaviorRegistry {
    /// Behaviors keyed by channel id (lowercase).
    by_channel: HashMap<String, ChannelBehavior>,
    /// Behavior for any channel not listed.
    fallback: ChannelBehavior,
}

impl BehaviorRegistry {
    /// Build every configured variant around a shared locale table.
    pub fn from_config(config: &ChannelsConfig, table: Arc<PhonePrefixTable>) -> Self {
        let fallback = ChannelBehavior::new(
            DeliveryPolicy::from(&config.default),
            Capabilities::DEFAULT,
            table.clone(),
        );
        let whatsapp = ChannelBehavior::new(
            DeliveryPolicy::from(&config.whatsapp),
            Capabilities::WHATSAPP,
            table,
        );

        let mut registry = Self {
            by_channel: HashMap::new(),
            fallback: fallback.clone(),
        };
        for id in &config.default.channel_ids {
            registry.register(id, fallback.clone());
        }
        for id in &config.whatsapp.channel_ids {
            registry.register(id, whatsapp.clone());
        }
        registry
    }

    /// Map `channel_id` to `behavior`. Overwrites any previous mapping.
    pub fn register(&mut self, channel_id: &str, behavior: ChannelBehavior) {
        let key = channel_id.trim().to_lowercase();
        info!(channel = %key, behavior = behavior.name(), "registered channel behavior");
        self.by_channel.insert(key, behavior);
    }

    /// Behavior for `channel_id`, or the default variant.
    pub fn resolve(&self, channel_id: &str) -> &ChannelBehavior {
        match self.by_channel.get(&channel_id.trim().to_lowercase()) {
            Some(behavior) => behavior,
            None => {
                debug!(channel = %channel_id, "no dedicated behavior, using default");
                &self.fallback
            }
        }
    }

    /// Registered channel ids with their variant names, sorted by id.
    pub fn channels(&self) -> Vec<(String, &'static str)> {
        let mut channels: Vec<(String, &'static str)> = self
            .by_channel
            .iter()
            .map(|(id, behavior)| (id.clone(), behavior.name()))
            .collect();
        channels.sort();
        channels
    }

    pub fn fallback(&self) -> &ChannelBehavior {
        &self.fallback
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
