//! Response generator layer for Parlo.
//!
//! # Architecture
//!
//! - [`traits::ResponseGenerator`] — trait that all generators implement
//! - [`http_provider::HttpGenerator`] — OpenAI-compatible HTTP client
//! - [`error::GeneratorError`] — failure taxonomy for generation

pub mod error;
pub mod http_provider;
pub mod traits;

// Re-export main types for convenience
pub use error::GeneratorError;
pub use http_provider::HttpGenerator;
pub use traits::{PromptContext, ResponseGenerator};
