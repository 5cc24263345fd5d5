//! Gemini extraction client.
//!
//! Calls the `generateContent` REST endpoint and returns the concatenated
//! text parts of the first candidate. The response is otherwise opaque to
//! the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{snippet, ExtractionClient, ExtractionError};
use crate::config::ExtractionSettings;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini REST client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client with the default model and a request timeout
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ExtractionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ExtractionError::Provider(
                "Gemini API key required (set GEMINI_API_KEY)".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        })
    }

    /// Create from resolved settings
    pub fn from_settings(
        api_key: impl Into<String>,
        settings: &ExtractionSettings,
    ) -> Result<Self, ExtractionError> {
        Ok(Self::new(api_key, Duration::from_secs(settings.timeout_seconds))?
            .with_base_url(settings.base_url.clone())
            .with_model(settings.model.clone()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ExtractionClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Provider(format!(
                "Gemini returned {}: {}",
                status.as_u16(),
                snippet(&body)
            )));
        }

        let body: GenerateResponse = response.json().await?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ExtractionError::Provider("Gemini returned no text".to_string()));
        }

        debug!(chars = text.len(), "Received model output");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_key() {
        let result = GeminiClient::new("", Duration::from_secs(5));
        assert!(matches!(result, Err(ExtractionError::Provider(_))));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new("key", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/")
            .with_model("gemini-test");
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9000/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(client.model(), "gemini-test");
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }
}
