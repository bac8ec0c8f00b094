// src/services/ai.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;

use crate::{config::AiConfig, error::AppError};

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// External free-text generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, AppError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    pub fn new(client: Client, config: &AiConfig, api_key: String) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            timeout: config.timeout,
        }
    }
}

const SYSTEM_PROMPT: &str = "You are an experienced NEET/JEE mentor. \
    Give honest, specific and encouraging feedback to a student based on their mock-test results. \
    Answer in plain text using exactly the section labels you are asked for.";

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, AppError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens
        });

        let res = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::InternalServerError(format!(
                "text generation API error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;
        extract_content(&body)
            .ok_or_else(|| AppError::InternalServerError("invalid completion response format".into()))
    }
}

/// Pulls `choices[0].message.content` out of a chat-completion body.
fn extract_content(body: &JsonValue) -> Option<String> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
}

/// Stand-in used when no API key is configured.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str, _params: GenerationParams) -> Result<String, AppError> {
        Err(AppError::InternalServerError(
            "text generation is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "FEEDBACK: good"}}]
        });
        assert_eq!(extract_content(&body).as_deref(), Some("FEEDBACK: good"));
    }

    #[test]
    fn test_extract_content_missing_or_blank() {
        assert!(extract_content(&serde_json::json!({"error": "quota"})).is_none());
        assert!(extract_content(&serde_json::json!({"choices": []})).is_none());
        let blank = serde_json::json!({"choices": [{"message": {"content": "  "}}]});
        assert!(extract_content(&blank).is_none());
    }

    #[tokio::test]
    async fn test_disabled_generator_always_fails() {
        let params = GenerationParams {
            temperature: 0.5,
            max_tokens: 10,
        };
        assert!(DisabledGenerator.generate("hi", params).await.is_err());
    }
}
