//! Parlo Channels — the outbound reply pipeline.
//!
//! This crate provides:
//! - **formatting**: Markdown → channel markup rewrites
//! - **segment**: length-bounded splitting of long replies
//! - **delivery**: ordered, paced, cancellable sending of the parts
//! - **locale**: phone-prefix locale and language lookup
//! - **identity**: hashed conversation ids and masked phone numbers
//! - **behavior**: per-channel variants tying the above together
//! - **registry**: channel id → behavior resolution
//! - **base**: the `MessageSender` trait provider integrations implement

pub mod base;
pub mod behavior;
pub mod delivery;
pub mod error;
pub mod formatting;
pub mod identity;
pub mod locale;
pub mod registry;
pub mod segment;

pub use base::{DeliveryReceipt, MessageSender};
pub use behavior::{Capabilities, ChannelBehavior, DeliveryPolicy, Metadata};
pub use delivery::deliver;
pub use error::DeliveryError;
pub use locale::PhonePrefixTable;
pub use registry::BehaviorRegistry;
pub use segment::{SegmentPlan, SegmentStrategy};
