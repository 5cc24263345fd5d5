//! AssemblyAI transcription adapter.
//!
//! Three calls per transcription: upload the raw audio, request a
//! transcript for the uploaded file, then poll until the provider reports
//! `completed` or `error`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{snippet, TranscriptionAdapter, TranscriptionError};
use crate::config::TranscriptionSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";

/// AssemblyAI REST client
pub struct AssemblyAiTranscriber {
    api_key: String,
    base_url: String,
    language_code: String,
    poll_interval: Duration,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: TranscriptStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Other,
}

impl AssemblyAiTranscriber {
    /// Create a transcriber against the public API
    pub fn new(api_key: impl Into<String>) -> Result<Self, TranscriptionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TranscriptionError::Config(
                "AssemblyAI API key required (set ASSEMBLYAI_API_KEY)".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language_code: "en".to_string(),
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
            client: reqwest::Client::new(),
        })
    }

    /// Create from resolved settings
    pub fn from_settings(
        api_key: impl Into<String>,
        settings: &TranscriptionSettings,
    ) -> Result<Self, TranscriptionError> {
        Ok(Self::new(api_key)?
            .with_base_url(settings.base_url.clone())
            .with_language_code(settings.language_code.clone())
            .with_poll_interval(Duration::from_millis(settings.poll_interval_ms))
            .with_timeout(Duration::from_secs(settings.timeout_seconds)))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Upper bound on the whole upload-and-poll cycle, stalled requests included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.base_url, path)
    }

    async fn upload(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .post(self.api_url("upload"))
            .header("authorization", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await?;

        let upload: UploadResponse = check_status(response).await?.json().await?;
        Ok(upload.upload_url)
    }

    async fn request_transcript(&self, audio_url: &str) -> Result<TranscriptResponse, TranscriptionError> {
        let response = self
            .client
            .post(self.api_url("transcript"))
            .header("authorization", &self.api_key)
            .json(&TranscriptRequest {
                audio_url,
                language_code: &self.language_code,
            })
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn fetch_transcript(&self, id: &str) -> Result<TranscriptResponse, TranscriptionError> {
        let response = self
            .client
            .get(self.api_url(&format!("transcript/{}", id)))
            .header("authorization", &self.api_key)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

/// Map a non-2xx response to `TranscriptionError::Status`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TranscriptionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(TranscriptionError::Status {
        status: status.as_u16(),
        body: snippet(&body),
    })
}

impl AssemblyAiTranscriber {
    async fn run(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let started = Instant::now();

        let upload_url = self.upload(audio).await?;
        debug!("Audio uploaded");

        let mut transcript = self.request_transcript(&upload_url).await?;
        let id = transcript.id.clone();

        loop {
            match transcript.status {
                TranscriptStatus::Completed => {
                    info!(
                        transcript_id = %id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Transcription completed"
                    );
                    return Ok(transcript.text.unwrap_or_default());
                }
                TranscriptStatus::Error => {
                    return Err(TranscriptionError::Provider(
                        transcript.error.unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing | TranscriptStatus::Other => {}
            }

            tokio::time::sleep(self.poll_interval).await;
            transcript = self.fetch_transcript(&id).await?;
        }
    }
}

#[async_trait]
impl TranscriptionAdapter for AssemblyAiTranscriber {
    fn name(&self) -> &str {
        "assemblyai"
    }

    #[instrument(skip(self, audio), fields(audio_bytes = audio.len()))]
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        // A stalled upload or poll counts against the same budget.
        tokio::time::timeout(self.timeout, self.run(audio))
            .await
            .map_err(|_| TranscriptionError::Timeout(self.timeout))?
    }
}
