//! Channel behaviors: the per-channel policy applied to every reply.
//!
//! A [`ChannelBehavior`] pairs a delivery policy (streaming on/off, length
//! limit, pacing) with a [`Capabilities`] record of plain functions that
//! decide formatting, locale lookup, persistence identity and metadata.
//! Variants are values, not types: adding a channel means adding a
//! `Capabilities` constant, and each function can be tested on its own.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use parlo_core::bus::OutboundMessage;
use parlo_core::config::BehaviorConfig;
use parlo_core::utils::char_len;

use crate::base::{DeliveryReceipt, MessageSender};
use crate::delivery::deliver;
use crate::error::DeliveryError;
use crate::formatting;
use crate::identity;
use crate::locale::PhonePrefixTable;
use crate::segment::{self, SegmentPlan, SegmentStrategy};

/// Fields worth persisting alongside a conversation.
pub type Metadata = BTreeMap<String, Option<String>>;

/// Rewrites reply text into the channel's markup.
pub type FormatFn = fn(&str) -> String;
/// Looks up a locale tag or language name for an address.
pub type LookupFn = for<'a> fn(&'a PhonePrefixTable, &str) -> &'a str;
/// Derives the identifier stored for a conversation.
pub type PersistenceIdFn = fn(&str) -> String;
/// Extracts persistable metadata from an address.
pub type MetadataFn = fn(&PhonePrefixTable, &str) -> Metadata;

// ─────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────

/// The functions that make one channel variant differ from another.
#[derive(Clone, Copy)]
pub struct Capabilities {
    pub name: &'static str,
    pub format: FormatFn,
    pub locale: LookupFn,
    pub language: LookupFn,
    pub persistence_id: PersistenceIdFn,
    pub metadata: MetadataFn,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").field("name", &self.name).finish()
    }
}

impl Capabilities {
    /// Any channel without a dedicated variant: text goes out as written,
    /// the raw address is the persistence id, nothing else is extracted.
    pub const DEFAULT: Capabilities = Capabilities {
        name: "default",
        format: formatting::passthrough,
        locale: configured_locale,
        language: configured_language,
        persistence_id: raw_address,
        metadata: no_metadata,
    };

    /// WhatsApp: Markdown is rewritten, locale comes from the phone prefix,
    /// and the address (a phone number) is only ever stored hashed.
    pub const WHATSAPP: Capabilities = Capabilities {
        name: "whatsapp",
        format: formatting::markdown_to_whatsapp,
        locale: PhonePrefixTable::resolve_locale,
        language: PhonePrefixTable::resolve_language,
        persistence_id: identity::hash_address,
        metadata: masked_mobile,
    };
}

fn configured_locale<'a>(table: &'a PhonePrefixTable, _address: &str) -> &'a str {
    table.default_locale()
}

fn configured_language<'a>(table: &'a PhonePrefixTable, _address: &str) -> &'a str {
    table.default_language()
}

fn raw_address(address: &str) -> String {
    address.to_string()
}

fn no_metadata(_table: &PhonePrefixTable, _address: &str) -> Metadata {
    Metadata::new()
}

fn masked_mobile(table: &PhonePrefixTable, address: &str) -> Metadata {
    let masked = table.phone_number(address).and_then(identity::mask_phone);
    Metadata::from([("mobile".to_string(), masked)])
}

// ─────────────────────────────────────────────
// DeliveryPolicy
// ─────────────────────────────────────────────

/// How long replies are handled on a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Segment replies longer than `max_length`. When false, every reply is
    /// one message regardless of length.
    pub requires_streaming: bool,
    /// Maximum characters per message.
    pub max_length: usize,
    /// Pause between list-item parts.
    pub pacing: Duration,
}

impl From<&BehaviorConfig> for DeliveryPolicy {
    fn from(config: &BehaviorConfig) -> Self {
        Self {
            requires_streaming: config.requires_streaming,
            max_length: config.max_length.max(1),
            pacing: Duration::from_millis(config.pacing_ms),
        }
    }
}

// ─────────────────────────────────────────────
// ChannelBehavior
// ─────────────────────────────────────────────

/// A channel variant ready to use: policy, capabilities and the shared
/// locale table. Holds no mutable state; cloning is cheap.
#[derive(Clone, Debug)]
pub struct ChannelBehavior {
    policy: DeliveryPolicy,
    capabilities: Capabilities,
    table: Arc<PhonePrefixTable>,
}

impl ChannelBehavior {
    pub fn new(policy: DeliveryPolicy, capabilities: Capabilities, table: Arc<PhonePrefixTable>) -> Self {
        Self {
            policy,
            capabilities,
            table,
        }
    }

    /// Variant name (`"default"`, `"whatsapp"`).
    pub fn name(&self) -> &'static str {
        self.capabilities.name
    }

    pub fn policy(&self) -> &DeliveryPolicy {
        &self.policy
    }

    /// Format `text` for this channel.
    pub fn format(&self, text: &str) -> String {
        (self.capabilities.format)(text)
    }

    /// Format `text` and decide how it will be split.
    ///
    /// Non-streaming variants always produce one part.
    pub fn plan_reply(&self, text: &str) -> SegmentPlan {
        let formatted = self.format(text);
        if !self.policy.requires_streaming || char_len(&formatted) <= self.policy.max_length {
            return SegmentPlan {
                parts: vec![formatted],
                strategy: SegmentStrategy::Whole,
            };
        }
        segment::plan(&formatted, self.policy.max_length)
    }

    /// Deliver `reply` through `sender` and return the receipt of the last
    /// message sent.
    pub async fn send_reply(
        &self,
        reply: &OutboundMessage,
        sender: &dyn MessageSender,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let plan = self.plan_reply(&reply.content);
        debug!(
            behavior = self.name(),
            parts = plan.len(),
            strategy = ?plan.strategy,
            "sending reply"
        );

        deliver(
            &reply.address,
            &plan.parts,
            sender,
            plan.pacing(self.policy.pacing),
            cancel,
        )
        .await
    }

    /// Locale tag for the conversation at `address`.
    pub fn resolve_locale(&self, address: &str) -> String {
        (self.capabilities.locale)(&self.table, address).to_string()
    }

    /// Language name for the conversation at `address`.
    pub fn resolve_language(&self, address: &str) -> String {
        (self.capabilities.language)(&self.table, address).to_string()
    }

    /// Identifier safe to write to storage for the conversation at `address`.
    pub fn persistence_id(&self, address: &str) -> String {
        (self.capabilities.persistence_id)(address)
    }

    /// Metadata worth persisting for the conversation at `address`.
    pub fn metadata(&self, address: &str) -> Metadata {
        (self.capabilities.metadata)(&self.table, address)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
