//! Local Whisper transcription adapter.
//!
//! Shells out to the `whisper` CLI for offline transcription. Audio bytes
//! are written to a temporary directory, whisper is asked for JSON output
//! next to them, and the `text` field is returned.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument};

use super::{snippet, TranscriptionAdapter, TranscriptionError};
use crate::config::TranscriptionSettings;

const AUDIO_STEM: &str = "recording";

/// Whisper CLI transcriber
pub struct WhisperTranscriber {
    binary_path: String,
    model: String,
    language: String,
    timeout: Duration,
}

/// Whisper output JSON structure
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
}

impl WhisperTranscriber {
    pub fn new(binary_path: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            model: model.into(),
            language: "en".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Create from resolved settings
    pub fn from_settings(settings: &TranscriptionSettings) -> Self {
        Self::new(settings.whisper_path.clone(), settings.whisper_model.clone())
            .with_language(settings.language_code.clone())
            .with_timeout(Duration::from_secs(settings.timeout_seconds))
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TranscriptionAdapter for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    #[instrument(skip(self, audio), fields(audio_bytes = audio.len(), model = %self.model))]
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let temp_dir = tempfile::tempdir()?;
        let audio_path = temp_dir.path().join(format!("{}.audio", AUDIO_STEM));
        tokio::fs::write(&audio_path, audio).await?;

        let child = Command::new(&self.binary_path)
            .arg(&audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_dir")
            .arg(temp_dir.path())
            .arg("--output_format")
            .arg("json")
            .arg("--language")
            .arg(&self.language)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TranscriptionError::Provider(format!(
                    "failed to run whisper at '{}': {}",
                    self.binary_path, e
                ))
            })?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TranscriptionError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptionError::Provider(format!(
                "whisper exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                snippet(stderr.trim())
            )));
        }

        let json_path = temp_dir.path().join(format!("{}.json", AUDIO_STEM));
        let json_content = tokio::fs::read_to_string(&json_path).await?;

        let whisper: WhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| TranscriptionError::Provider(format!("unreadable whisper output: {}", e)))?;

        debug!(chars = whisper.text.len(), "Whisper transcription finished");
        Ok(whisper.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whisper_defaults() {
        let transcriber = WhisperTranscriber::new("whisper", "base");
        assert_eq!(transcriber.name(), "whisper");
        assert_eq!(transcriber.language, "en");
        assert_eq!(transcriber.timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_missing_binary_is_provider_error() {
        let transcriber = WhisperTranscriber::new("/nonexistent/whisper-binary", "base");
        let result = transcriber.transcribe(b"not really audio").await;
        assert!(matches!(result, Err(TranscriptionError::Provider(_))));
    }
}
