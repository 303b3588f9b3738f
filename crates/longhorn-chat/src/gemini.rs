//! Gemini `generateContent` client.
//!
//! One request per prompt with fixed sampling parameters. No retries and no
//! streaming; any failure is returned to the caller.

use async_trait::async_trait;
use longhorn_core::{Error, GeminiConfig, Result};
use reqwest::Client;
use tracing::{debug, error};

use crate::types::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// Anything that turns a prompt into generated text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Client for the hosted Gemini API.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    generation_config: GenerationConfig,
}

impl GeminiClient {
    /// Build a client from configuration. A missing API key is not an error
    /// here; it surfaces on the first `generate` call.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            generation_config: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// `{base}/v1beta/models/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    pub fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest::from_prompt(prompt, self.generation_config)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY is not set".into()))?;

        let url = self.endpoint();
        debug!("Generating with {} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error {}: {}", status, body);
            return Err(Error::Generation(format!("API error {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Invalid response body: {}", e)))?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                candidates_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "generation usage"
            );
        }

        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.block_reason() {
        return Err(Error::Generation(format!("Prompt blocked: {}", reason)));
    }
    match response.text() {
        Some(text) => Ok(text),
        None => {
            let finish = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".into());
            Err(Error::Generation(format!(
                "Response contained no text ({})",
                finish
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_with(api_key: Option<&str>) -> GeminiClient {
        let config = GeminiConfig {
            api_key: api_key.map(String::from),
            base_url: "https://example.test/".into(),
            ..GeminiConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let client = client_with(Some("k"));
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn test_request_carries_fixed_sampling() {
        let client = client_with(Some("k"));
        let request = client.build_request("Who is Bevo?");
        assert_eq!(
            request.generation_config,
            GenerationConfig {
                temperature: 0.9,
                top_p: 1.0,
                top_k: 1,
                max_output_tokens: 1000,
            }
        );
        assert_eq!(
            request.contents[0].parts[0].text.as_deref(),
            Some("Who is Bevo?")
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let client = client_with(None);
        assert!(!client.has_api_key());
        let err = client.generate("anything").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_extract_text_errors() {
        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "OTHER"}})).unwrap();
        assert!(matches!(extract_text(blocked), Err(Error::Generation(_))));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "MAX_TOKENS"}]}))
                .unwrap();
        match extract_text(empty) {
            Err(Error::Generation(msg)) => assert!(msg.contains("MAX_TOKENS")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
