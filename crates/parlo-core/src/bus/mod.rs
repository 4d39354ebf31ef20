//! Inbound and outbound message types.

pub mod types;

pub use types::{InboundMessage, OutboundMessage};
