//! Core extraction pipeline.
//!
//! This module contains:
//! - Prompt: Deterministic extraction instructions
//! - Interpret: Model output to normalized fields
//! - Dates / Correction: Rule-based due dates that override the model
//! - Fallback: Offline heuristic parser
//! - Orchestrator: Request sequencing and the fallback transition

pub mod correction;
pub mod dates;
pub mod fallback;
pub mod interpret;
pub mod orchestrator;
pub mod prompt;

// Re-export commonly used types
pub use correction::correct_due_date;
pub use dates::{end_of_day, next_weekday, scan_transcript, CorrectionRule, DateTarget};
pub use fallback::{detect_priority, extract_title, fallback_parse};
pub use interpret::{interpret, parse_due_date};
pub use orchestrator::{ParseError, VoiceParser};
pub use prompt::build_prompt;
