//! Adapter interfaces for external systems.
//!
//! The pipeline consumes two outside services through narrow traits:
//! a speech-to-text provider ([`TranscriptionAdapter`]) and a generative
//! language model ([`ExtractionClient`]). Concrete adapters build their
//! HTTP client once and reuse it across requests.

pub mod assemblyai;
pub mod gemini;
pub mod whisper;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use assemblyai::AssemblyAiTranscriber;
pub use gemini::GeminiClient;
pub use whisper::WhisperTranscriber;

/// Errors from a transcription provider.
///
/// These are fatal to a parse: without a transcript there is nothing to
/// fall back on.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Transcription request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transcription provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transcription failed: {0}")]
    Provider(String),

    #[error("Transcription timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transcription configuration error: {0}")]
    Config(String),
}

/// Errors from the extraction step.
///
/// Always recoverable: the orchestrator answers both kinds with the
/// offline fallback parser.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Transport failure, error status, or an empty response
    #[error("Extraction provider error: {0}")]
    Provider(String),

    /// Output held no decodable JSON object
    #[error("Malformed extraction output: {0}")]
    Format(String),
}

impl ExtractionError {
    /// Whether the pipeline can still produce a draft after this error.
    /// Every extraction failure is answered with the fallback parser.
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(e: reqwest::Error) -> Self {
        ExtractionError::Provider(e.to_string())
    }
}

/// Speech-to-text provider
#[async_trait]
pub trait TranscriptionAdapter: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Convert raw audio bytes to a transcript.
    ///
    /// An empty string is a valid result (silence); the orchestrator
    /// decides what to do with it.
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError>;
}

/// Generative language model used for field extraction
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Send a prompt and return the raw model text
    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError>;
}

/// Truncate a response body for inclusion in an error message
pub(crate) fn snippet(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{}…", head)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_errors_are_recoverable() {
        assert!(ExtractionError::Provider("503 Service Unavailable".into()).is_recoverable());
        assert!(ExtractionError::Format("no JSON object found".into()).is_recoverable());
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        assert_eq!(snippet("short"), "short");
        let long = "x".repeat(400);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), 301);
        assert!(cut.ends_with('…'));
    }
}
