//! HTTP response generator for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint (OpenAI, Azure OpenAI
//! behind a compatible proxy, vLLM, Ollama, ...).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use parlo_core::config::GeneratorConfig;
use parlo_core::types::{ChatCompletionRequest, ChatCompletionResponse};

use crate::error::GeneratorError;
use crate::traits::{PromptContext, ResponseGenerator};

// ─────────────────────────────────────────────
// HttpGenerator
// ─────────────────────────────────────────────

/// A generator that calls an OpenAI-compatible chat completions API.
pub struct HttpGenerator {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Model or deployment name.
    model: String,
    /// Maximum tokens to generate.
    max_tokens: u32,
    /// Sampling temperature.
    temperature: f64,
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpGenerator {
    /// Create a generator from its config section.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        if config.api_base.trim().is_empty() {
            return Err(GeneratorError::Config("apiBase is empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(GeneratorError::Config("model is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpGenerator {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl ResponseGenerator for HttpGenerator {
    async fn generate(&self, context: &PromptContext, input: &str) -> Result<String, GeneratorError> {
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: context.to_messages(input),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        debug!(
            model = %self.model,
            language = context.language.as_deref().unwrap_or("-"),
            input_len = input.len(),
            "calling generator"
        );

        let mut request = self.client.post(self.completions_url()).json(&request_body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(model = %self.model, error = %e, "generator request failed");
            GeneratorError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "generator API error");
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = &completion.usage {
            debug!(total_tokens = usage.total_tokens, "generator usage");
        }

        match completion.into_content() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GeneratorError::EmptyReply),
        }
    }

    fn display_name(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(api_key: &str, api_base: &str) -> GeneratorConfig {
        GeneratorConfig {
            api_key: api_key.to_string(),
            api_base: api_base.to_string(),
            model: "gpt-4o".to_string(),
            ..GeneratorConfig::default()
        }
    }

    fn completion(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": { "content": content },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15
            }
        })
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let generator = HttpGenerator::new(&make_config("key", "https://api.openai.com/v1/")).unwrap();
        assert_eq!(
            generator.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_completions_url_no_trailing_slash() {
        let generator = HttpGenerator::new(&make_config("key", "http://localhost:11434/v1")).unwrap();
        assert_eq!(
            generator.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_empty_api_base_rejected() {
        let err = HttpGenerator::new(&make_config("key", "  ")).unwrap_err();
        assert!(matches!(err, GeneratorError::Config(_)));
    }

    #[test]
    fn test_display_name_is_model() {
        let generator = HttpGenerator::new(&make_config("key", "http://localhost")).unwrap();
        assert_eq!(generator.display_name(), "gpt-4o");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion("Hello! How can I help?".into())),
            )
            .mount(&mock_server)
            .await;

        let generator = HttpGenerator::new(&make_config("test-key-123", &mock_server.uri())).unwrap();
        let reply = generator
            .generate(&PromptContext::new("You are helpful."), "Hello")
            .await
            .unwrap();

        assert_eq!(reply, "Hello! How can I help?");
    }

    #[tokio::test]
    async fn test_generate_sends_language_hint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 4096,
                "messages": [
                    { "role": "system", "content": "Be brief.\n\nReply in Italian." },
                    { "role": "user", "content": "Ciao" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Ciao!".into())))
            .mount(&mock_server)
            .await;

        let generator = HttpGenerator::new(&make_config("key", &mock_server.uri())).unwrap();
        let ctx = PromptContext::new("Be brief.").with_language("Italian");

        // If the body matcher fails, wiremock returns 404 → Api error
        let reply = generator.generate(&ctx, "Ciao").await.unwrap();
        assert_eq!(reply, "Ciao!");
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&mock_server)
            .await;

        let generator = HttpGenerator::new(&make_config("key", &mock_server.uri())).unwrap();
        let err = generator
            .generate(&PromptContext::default(), "Hello")
            .await
            .unwrap_err();

        match err {
            GeneratorError::Api { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_generate_null_content_is_empty_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(serde_json::Value::Null)))
            .mount(&mock_server)
            .await;

        let generator = HttpGenerator::new(&make_config("key", &mock_server.uri())).unwrap();
        let err = generator
            .generate(&PromptContext::default(), "Hello")
            .await
            .unwrap_err();

        assert!(matches!(err, GeneratorError::EmptyReply));
    }

    #[tokio::test]
    async fn test_generate_network_error() {
        // Point to a port that's not listening
        let generator = HttpGenerator::new(&make_config("key", "http://127.0.0.1:1")).unwrap();
        let err = generator
            .generate(&PromptContext::default(), "Hello")
            .await
            .unwrap_err();

        assert!(matches!(err, GeneratorError::Http(_)));
    }
}
