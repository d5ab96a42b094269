//! Gemini API client
//!
//! Thin wrapper over the `generateContent` endpoint.
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::config::LlmConfig;
use crate::error::DashboardError;

/// Anything that turns a prompt into generated text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> crate::Result<String>;

    /// Model name shown on the settings page
    fn model(&self) -> &str;
}

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client for the configured key, or `None` when AI features are disabled
    pub fn from_config(config: &LlmConfig) -> crate::Result<Option<Self>> {
        match &config.api_key {
            Some(key) => Ok(Some(Self::new(
                key.clone(),
                config.model.clone(),
                config.base_url.clone(),
                config.timeout,
            )?)),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(DashboardError::ConfigError(
                "GOOGLE_API_KEY not configured".to_string(),
            ));
        }

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 2048,
            },
        };

        info!(model = %self.model, prompt_chars = prompt.len(), "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, which carries the key
                let e = e.without_url();
                error!("Gemini API request failed: {}", e);
                DashboardError::LlmError(format!("Gemini API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, "Gemini API error response: {}", error_text);
            return Err(DashboardError::LlmError(format!(
                "Gemini API returned {}: {}",
                status,
                api_error_message(&error_text)
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e.without_url());
            DashboardError::LlmError("Gemini returned a malformed response".to_string())
        })?;

        let candidate = gemini_response.candidates.first().ok_or_else(|| {
            DashboardError::LlmError("No response from Gemini API".to_string())
        })?;

        let answer: String = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(DashboardError::LlmError(format!(
                "Empty response from Gemini (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        if let Some(usage) = &gemini_response.usage_metadata {
            info!(
                prompt_tokens = usage.prompt_token_count,
                response_tokens = usage.candidates_token_count,
                "Gemini response received"
            );
        }

        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw text
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i32,
    #[serde(default)]
    candidates_token_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
        GeminiClient::new(
            "test-key".to_string(),
            "gemini-2.5-flash".to_string(),
            server.url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "What is our attrition rate?".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 2048,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "What is our attrition rate?");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"Revenue is up."}]},"finishReason":"STOP"}],
                    "usageMetadata":{"promptTokenCount":12,"candidatesTokenCount":4}}"#,
            )
            .create_async()
            .await;

        let answer = client_for(&server).generate("How is revenue?").await.unwrap();

        assert_eq!(answer, "Revenue is up.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate("How is revenue?").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("Quota exceeded"));
        assert!(!message.contains("test-key"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_candidates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate("anything").await.unwrap_err();
        assert!(matches!(err, DashboardError::LlmError(_)));
    }

    #[tokio::test]
    async fn test_empty_key_is_a_config_error() {
        let client = GeminiClient::new(
            String::new(),
            "gemini-2.5-flash".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.generate("anything").await.unwrap_err();
        assert!(matches!(err, DashboardError::ConfigError(_)));
    }
}
