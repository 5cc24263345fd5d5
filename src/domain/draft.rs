//! Task drafts produced by the parsing pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::task::{Priority, Status};

/// Maximum title length, in characters
pub const MAX_TITLE_CHARS: usize = 100;

/// Title used when nothing usable survives cleanup
pub const DEFAULT_TITLE: &str = "New Task";

/// The normalized, validated task fields handed back to the caller.
///
/// A draft is built once per submission and never mutated afterwards;
/// persisting it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTaskDraft {
    /// The utterance the draft was derived from, verbatim
    pub transcript: String,

    /// Non-empty, at most [`MAX_TITLE_CHARS`] characters
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub priority: Priority,

    /// Local wall-clock due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,

    pub status: Status,
}

/// Fields recovered from a model response, before correction.
///
/// Priority and status are already defaulted; only the free-text fields
/// and the date can be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDateTime>,
    pub status: Status,
}

/// Enforce the title length limit.
///
/// Titles over [`MAX_TITLE_CHARS`] keep their first 97 characters followed
/// by `...`. Counts characters, not bytes.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_truncate_title_limits() {
        assert_eq!(truncate_title("Call mom"), "Call mom");

        let exact = "a".repeat(100);
        assert_eq!(truncate_title(&exact), exact);

        let long = "b".repeat(150);
        let truncated = truncate_title(&long);
        assert_eq!(truncated.chars().count(), 100);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_title_multibyte() {
        let long = "é".repeat(120);
        let truncated = truncate_title(&long);
        assert_eq!(truncated.chars().count(), 100);
    }

    #[test]
    fn test_draft_serialization() {
        let draft = NormalizedTaskDraft {
            transcript: "call mom tomorrow".to_string(),
            title: "Call mom".to_string(),
            description: None,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 2)
                .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999)),
            status: Status::ToDo,
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["title"], "Call mom");
        assert_eq!(json["priority"], "High");
        assert_eq!(json["status"], "To Do");
        assert_eq!(json["dueDate"], "2024-01-02T23:59:59.999");
        assert!(json.get("description").is_none());
    }
}
