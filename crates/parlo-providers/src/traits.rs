//! Response generator trait — the opaque "input text in, reply text out" call.

use async_trait::async_trait;
use parlo_core::types::Message;

use crate::error::GeneratorError;

/// Per-turn context handed to a generator alongside the inbound text.
#[derive(Clone, Debug, Default)]
pub struct PromptContext {
    /// System prompt for the conversation.
    pub system_prompt: String,
    /// Language the reply should be written in, when known.
    pub language: Option<String>,
}

impl PromptContext {
    /// Create a context with only a system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            language: None,
        }
    }

    /// Attach a reply-language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Build the message list for a single-turn completion.
    pub fn to_messages(&self, input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        let system = match &self.language {
            Some(language) if !self.system_prompt.is_empty() => {
                format!("{}\n\nReply in {}.", self.system_prompt, language)
            }
            Some(language) => format!("Reply in {}.", language),
            None => self.system_prompt.clone(),
        };
        if !system.is_empty() {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(input));
        messages
    }
}

/// Anything that can turn an inbound message into reply text.
///
/// The main implementation is [`crate::HttpGenerator`], which talks to any
/// OpenAI-compatible chat completions API.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce a reply for `input`.
    async fn generate(&self, context: &PromptContext, input: &str) -> Result<String, GeneratorError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
