//! Command-line interface for voicetask.
//!
//! Provides commands for parsing typed or recorded task descriptions,
//! inspecting the extraction prompt, running the offline parser, and
//! showing the resolved configuration.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::adapters::{
    AssemblyAiTranscriber, ExtractionClient, GeminiClient, TranscriptionAdapter, WhisperTranscriber,
};
use crate::config::{self, ResolvedConfig, TranscriptionProvider};
use crate::core::{build_prompt, fallback_parse, ParseError, VoiceParser};
use crate::domain::NormalizedTaskDraft;

/// voicetask - Turn spoken or typed task descriptions into structured tasks
#[derive(Parser, Debug)]
#[command(name = "voicetask")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a typed task description
    Text {
        /// Transcript (reads from stdin if not provided)
        transcript: Option<String>,

        /// Resolve relative dates against this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Transcribe an audio file and parse it
    Audio {
        /// Path to the recording
        file: PathBuf,

        /// Resolve relative dates against this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the extraction prompt for a transcript
    Prompt {
        /// Transcript (reads from stdin if not provided)
        transcript: Option<String>,

        /// Resolve relative dates against this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Parse with the offline rules only (no network)
    Offline {
        /// Transcript (reads from stdin if not provided)
        transcript: Option<String>,

        /// Resolve relative dates against this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Text { transcript, date } => parse_text(transcript, date).await,
            Commands::Audio { file, date } => parse_audio(&file, date).await,
            Commands::Prompt { transcript, date } => {
                let transcript = read_transcript(transcript)?;
                println!("{}", build_prompt(&transcript, reference_time(date)));
                Ok(())
            }
            Commands::Offline { transcript, date } => {
                let transcript = read_transcript(transcript)?;
                print_draft(&fallback_parse(&transcript, reference_time(date)))
            }
            Commands::Config => show_config(),
        }
    }
}

/// Build a parser with one long-lived client per provider
pub fn build_parser(cfg: &ResolvedConfig) -> Result<VoiceParser> {
    let transcriber: Arc<dyn TranscriptionAdapter> = match cfg.transcription.provider {
        TranscriptionProvider::AssemblyAi => Arc::new(AssemblyAiTranscriber::from_settings(
            cfg.assemblyai_api_key.clone().unwrap_or_default(),
            &cfg.transcription,
        )?),
        TranscriptionProvider::Whisper => {
            Arc::new(WhisperTranscriber::from_settings(&cfg.transcription))
        }
    };

    Ok(VoiceParser::new(transcriber, extraction_client(cfg)?))
}

/// Parse a typed transcript through the full pipeline
async fn parse_text(transcript: Option<String>, date: Option<NaiveDate>) -> Result<()> {
    let cfg = config::config()?;
    let transcript = read_transcript(transcript)?;
    let parser = text_parser(cfg)?;
    let now = reference_time(date);

    let draft = with_request_timeout(cfg, parser.parse_text_at(&transcript, now)).await?;
    print_draft(&draft)
}

/// Transcribe an audio file, then parse the transcript
async fn parse_audio(file: &Path, date: Option<NaiveDate>) -> Result<()> {
    let cfg = config::config()?;
    let audio = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read audio file: {}", file.display()))?;

    let parser = build_parser(cfg)?;
    let now = reference_time(date);

    let draft = with_request_timeout(cfg, parser.parse_at(&audio, now)).await?;
    print_draft(&draft)
}

/// Text input never touches the transcriber, so its key is not required
fn text_parser(cfg: &ResolvedConfig) -> Result<VoiceParser> {
    Ok(VoiceParser::text_only(extraction_client(cfg)?))
}

fn extraction_client(cfg: &ResolvedConfig) -> Result<Arc<dyn ExtractionClient>> {
    Ok(Arc::new(GeminiClient::from_settings(
        cfg.gemini_api_key.clone().unwrap_or_default(),
        &cfg.extraction,
    )?))
}

/// Bound a whole parse by the configured request timeout
async fn with_request_timeout(
    cfg: &ResolvedConfig,
    parse: impl std::future::Future<Output = Result<NormalizedTaskDraft, ParseError>>,
) -> Result<NormalizedTaskDraft> {
    let limit = Duration::from_secs(cfg.request_timeout_seconds);

    match tokio::time::timeout(limit, parse).await {
        Ok(Ok(draft)) => Ok(draft),
        Ok(Err(ParseError::EmptyTranscript)) => {
            anyhow::bail!("No speech detected - nothing to turn into a task")
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => anyhow::bail!("Parsing timed out after {:?}", limit),
    }
}

/// Take the transcript from the argument, or from piped stdin
fn read_transcript(arg: Option<String>) -> Result<String> {
    let transcript = match arg {
        Some(text) => text,
        None if !io::stdin().is_terminal() => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
        None => anyhow::bail!("No transcript provided. Pass it as an argument or pipe to stdin"),
    };

    if transcript.trim().is_empty() {
        anyhow::bail!("Transcript is empty");
    }

    Ok(transcript)
}

/// Noon on the pinned day, or the local wall clock
fn reference_time(date: Option<NaiveDate>) -> NaiveDateTime {
    date.and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_else(|| Local::now().naive_local())
}

fn print_draft(draft: &NormalizedTaskDraft) -> Result<()> {
    let json = serde_json::to_string_pretty(draft).context("Failed to serialize draft")?;
    println!("{}", json);
    Ok(())
}

fn mask(key: &Option<String>) -> String {
    match key {
        Some(k) if k.chars().count() > 8 => {
            let chars: Vec<char> = k.chars().collect();
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}…{}", head, tail)
        }
        Some(_) => "(set)".to_string(),
        None => "(not set)".to_string(),
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("voicetask configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Transcription:");
    println!("  Provider:      {}", cfg.transcription.provider);
    println!("  Base URL:      {}", cfg.transcription.base_url);
    println!("  Language:      {}", cfg.transcription.language_code);
    println!("  Poll interval: {}ms", cfg.transcription.poll_interval_ms);
    println!("  Timeout:       {}s", cfg.transcription.timeout_seconds);
    println!("  Whisper:       {} (model {})", cfg.transcription.whisper_path, cfg.transcription.whisper_model);
    println!("  API key:       {}", mask(&cfg.assemblyai_api_key));
    println!();
    println!("Extraction:");
    println!("  Base URL:      {}", cfg.extraction.base_url);
    println!("  Model:         {}", cfg.extraction.model);
    println!("  Timeout:       {}s", cfg.extraction.timeout_seconds);
    println!("  API key:       {}", mask(&cfg.gemini_api_key));
    println!();
    println!("Request timeout: {}s", cfg.request_timeout_seconds);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_text_command() {
        let cli = Cli::try_parse_from(["voicetask", "text", "buy milk", "--date", "2024-01-01"]).unwrap();
        match cli.command {
            Commands::Text { transcript, date } => {
                assert_eq!(transcript.as_deref(), Some("buy milk"));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_reference_time_pins_noon() {
        let now = reference_time(NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(now.to_string(), "2024-01-01 12:00:00");
    }

    #[test]
    fn test_transcript_argument_passed_verbatim() {
        let transcript = read_transcript(Some("  buy milk tomorrow \n".to_string())).unwrap();
        assert_eq!(transcript, "  buy milk tomorrow \n");
    }

    #[test]
    fn test_blank_transcript_argument_rejected() {
        assert!(read_transcript(Some(" \t ".to_string())).is_err());
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask(&None), "(not set)");
        assert_eq!(mask(&Some("short".to_string())), "(set)");
        assert_eq!(mask(&Some("abcd1234wxyz".to_string())), "abcd…wxyz");
    }
}
