//! OpenAI-compatible chat-completion client.

use crate::{CompletionParams, DialogueClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;
use thymos_core::{DialogueTurn, ThymosError};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Reads `OPENAI_API_KEY` (falling back to `"mock"`, which serves a
    /// canned reply) and an optional `OPENAI_BASE_URL` override.
    pub fn new(model: &str) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| "mock".to_string());
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()?,
            api_key,
            base_url,
            model: model.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }
}

#[async_trait]
impl DialogueClient for OpenAiClient {
    async fn complete(
        &self,
        history: &[DialogueTurn],
        params: &CompletionParams,
    ) -> Result<String> {
        if self.api_key == "mock" {
            tokio::time::sleep(Duration::from_millis(100)).await;
            return Ok("(Mock reply) Tell me more about how you're feeling.".to_string());
        }

        let payload = json!({
            "model": self.model,
            "messages": history,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to dialogue service")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ThymosError::ProviderUnavailable(format!(
                "dialogue service returned HTTP {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to parse dialogue response")?;

        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Dialogue response contained no choices")?;

        tracing::debug!(model = %self.model, chars = reply.len(), "dialogue reply received");
        Ok(reply)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use thymos_core::dialogue;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new("gpt-3.5-turbo")
            .unwrap()
            .with_api_key("test-key")
            .with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn test_complete_sends_history_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": dialogue::SYSTEM_PROMPT },
                    { "role": "assistant", "content": dialogue::GREETING },
                    { "role": "user", "content": "I'm tired" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "A spa day might help." } }
                ]
            })))
            .mount(&server)
            .await;

        let mut history = dialogue::initial_history();
        history.push(DialogueTurn::user("I'm tired"));

        let reply = client_for(&server)
            .complete(&history, &CompletionParams::default())
            .await
            .unwrap();
        assert_eq!(reply, "A spa day might help.");
    }

    #[tokio::test]
    async fn test_complete_http_error_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .complete(&dialogue::initial_history(), &CompletionParams::default())
            .await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("429"), "expected status in error, got: {}", err);
    }

    #[tokio::test]
    async fn test_complete_empty_choices_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .complete(&dialogue::initial_history(), &CompletionParams::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_key_serves_canned_reply() {
        let client = OpenAiClient::new("gpt-3.5-turbo").unwrap().with_api_key("mock");
        let reply = client
            .complete(&dialogue::initial_history(), &CompletionParams::default())
            .await
            .unwrap();
        assert!(!reply.is_empty());
    }
}
