//! voicetask - Voice-to-structured-task extraction pipeline
//!
//! Turns a spoken or typed task description into a validated task draft
//! (title, description, priority, due date, status).
//!
//! # Architecture
//!
//! The pipeline is a single forward pass per request:
//! - A transcription adapter turns audio into a transcript
//! - A generative model proposes fields from a deterministic prompt
//! - Rule-based date correction overrides the model where it is unreliable
//! - Any extraction failure falls back to an offline heuristic parser,
//!   so only an empty transcript or a transcription failure reaches the
//!   caller as an error
//!
//! # Modules
//!
//! - `adapters`: External services (AssemblyAI, Whisper, Gemini)
//! - `core`: Prompt, interpretation, correction, fallback, orchestration
//! - `domain`: Data structures (Priority, Status, NormalizedTaskDraft)
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Parse typed input
//! voicetask text "remind me to call mom tomorrow, it's urgent"
//!
//! # Transcribe and parse a recording
//! voicetask audio memo.m4a
//!
//! # Offline rules only
//! voicetask offline "submit report by friday"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::adapters::{ExtractionClient, ExtractionError, TranscriptionAdapter, TranscriptionError};
pub use crate::core::{build_prompt, correct_due_date, fallback_parse, interpret, ParseError, VoiceParser};
pub use crate::domain::{ExtractedFields, NormalizedTaskDraft, Priority, Status};
