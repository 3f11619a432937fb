//! OpenAI-compatible chat completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use docqa_core::{DocQaError, GenerationConfig, GenerationParams, Generator, Result};

use crate::{auth_headers, http_client};

const PROVIDER: &str = "chat";

/// Single-prompt generation over a `/chat/completions` endpoint.
pub struct ChatCompletions {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl ChatCompletions {
    /// Create a client from configuration.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(DocQaError::config("generation.api_key is not set"));
        }

        Ok(Self {
            client: http_client(PROVIDER, config.timeout_ms)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn request_body(&self, prompt: &str, params: &GenerationParams) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        })
    }
}

#[async_trait]
impl Generator for ChatCompletions {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        debug!(
            "Generating with {} ({} prompt chars, max {} tokens)",
            self.model,
            prompt.len(),
            params.max_tokens
        );

        let res = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .headers(auth_headers(PROVIDER, &self.api_key)?)
            .json(&self.request_body(prompt, params))
            .send()
            .await
            .map_err(|e| DocQaError::generation(e.to_string()))?;

        let json: Value = res
            .error_for_status()
            .map_err(|e| DocQaError::generation(e.to_string()))?
            .json()
            .await
            .map_err(|e| DocQaError::generation(e.to_string()))?;

        parse_completion(&json)
    }
}

fn parse_completion(json: &Value) -> Result<String> {
    json.get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.pointer("/message/content"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| DocQaError::generation("Completion response is missing message content."))
}
