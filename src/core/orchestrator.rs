//! Voice parsing orchestrator.
//!
//! Sequences a single request: transcription, then one extraction attempt
//! (prompt, model call, interpretation, date correction), with the offline
//! fallback parser as the answer to any extraction failure.
//!
//! ```text
//! audio → transcript ─┬─ prompt → model → interpret → correct ─→ draft
//!                     └─ (extraction failed) → fallback_parse ──→ draft
//! ```

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{ExtractionClient, ExtractionError, TranscriptionAdapter, TranscriptionError};
use crate::domain::{truncate_title, NormalizedTaskDraft};

use super::correction::correct_due_date;
use super::fallback::{extract_title, fallback_parse};
use super::interpret::interpret;
use super::prompt::build_prompt;

/// Errors surfaced to the caller of a parse.
///
/// Extraction failures never appear here; they are absorbed by the
/// fallback path.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No speech detected in audio")]
    EmptyTranscript,

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

/// Turns audio or text into a normalized task draft
pub struct VoiceParser {
    transcriber: Option<Arc<dyn TranscriptionAdapter>>,
    extractor: Arc<dyn ExtractionClient>,
}

impl VoiceParser {
    /// Create a parser from long-lived adapters
    pub fn new(
        transcriber: Arc<dyn TranscriptionAdapter>,
        extractor: Arc<dyn ExtractionClient>,
    ) -> Self {
        Self {
            transcriber: Some(transcriber),
            extractor,
        }
    }

    /// Create a parser for typed input only; audio parses are rejected
    pub fn text_only(extractor: Arc<dyn ExtractionClient>) -> Self {
        Self {
            transcriber: None,
            extractor,
        }
    }

    /// Transcribe audio and parse it against the current local time
    pub async fn parse(&self, audio: &[u8]) -> Result<NormalizedTaskDraft, ParseError> {
        self.parse_at(audio, Local::now().naive_local()).await
    }

    /// Transcribe audio and parse it against a fixed `now`
    #[instrument(skip(self, audio, now), fields(request_id = %Uuid::new_v4()))]
    pub async fn parse_at(
        &self,
        audio: &[u8],
        now: NaiveDateTime,
    ) -> Result<NormalizedTaskDraft, ParseError> {
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            TranscriptionError::Config("no transcription adapter configured".to_string())
        })?;
        info!(audio_bytes = audio.len(), transcriber = transcriber.name(), "Transcribing audio");

        let transcript = transcriber.transcribe(audio).await.map_err(|e| {
            error!(error = %e, "Transcription failed");
            ParseError::Transcription(e)
        })?;

        self.parse_transcript(transcript, now).await
    }

    /// Parse a typed transcript against the current local time
    pub async fn parse_text(&self, transcript: &str) -> Result<NormalizedTaskDraft, ParseError> {
        self.parse_text_at(transcript, Local::now().naive_local()).await
    }

    /// Parse a typed transcript against a fixed `now`
    #[instrument(skip(self, transcript, now), fields(request_id = %Uuid::new_v4()))]
    pub async fn parse_text_at(
        &self,
        transcript: &str,
        now: NaiveDateTime,
    ) -> Result<NormalizedTaskDraft, ParseError> {
        self.parse_transcript(transcript.to_string(), now).await
    }

    async fn parse_transcript(
        &self,
        transcript: String,
        now: NaiveDateTime,
    ) -> Result<NormalizedTaskDraft, ParseError> {
        if transcript.trim().is_empty() {
            error!("Empty transcript, refusing to guess");
            return Err(ParseError::EmptyTranscript);
        }
        debug!(%transcript, "Transcript ready");

        match self.extract(&transcript, now).await {
            Ok(draft) => {
                info!(
                    priority = %draft.priority,
                    status = %draft.status,
                    has_due_date = draft.due_date.is_some(),
                    "Extraction succeeded"
                );
                Ok(draft)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    extractor = self.extractor.name(),
                    recoverable = e.is_recoverable(),
                    "Extraction failed, using fallback parser"
                );
                Ok(fallback_parse(&transcript, now))
            }
        }
    }

    /// One extraction attempt.
    ///
    /// Every failure is an [`ExtractionError`], which the caller recovers
    /// from with the fallback parser.
    pub async fn extract(
        &self,
        transcript: &str,
        now: NaiveDateTime,
    ) -> Result<NormalizedTaskDraft, ExtractionError> {
        let prompt = build_prompt(transcript, now);
        let raw = self.extractor.generate(&prompt).await?;
        let fields = interpret(&raw)?;

        let title = match fields.title {
            Some(title) => truncate_title(&title),
            None => extract_title(transcript),
        };

        Ok(NormalizedTaskDraft {
            transcript: transcript.to_string(),
            title,
            description: fields.description,
            priority: fields.priority,
            due_date: correct_due_date(transcript, fields.due_date, now),
            status: fields.status,
        })
    }
}
