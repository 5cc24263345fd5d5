//! Domain types for the voicetask pipeline.
//!
//! This module contains the core data structures:
//! - Task: Priority and status vocabularies
//! - Draft: The normalized output of a parse, plus the intermediate
//!   fields recovered from model output

pub mod draft;
pub mod task;

// Re-export commonly used types
pub use draft::{truncate_title, ExtractedFields, NormalizedTaskDraft, DEFAULT_TITLE, MAX_TITLE_CHARS};
pub use task::{Priority, Status};
