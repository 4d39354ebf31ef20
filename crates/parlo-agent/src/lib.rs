//! Parlo Agent — the turn relay.
//!
//! This crate contains:
//! - **relay**: `ReplyRelay`, which turns inbound messages into delivered
//!   replies and runs many conversations concurrently
//! - **error**: `RelayError`, the failure taxonomy for a turn

pub mod error;
pub mod relay;

pub use error::RelayError;
pub use relay::{ReplyRelay, RunSummary, TurnOutcome};
