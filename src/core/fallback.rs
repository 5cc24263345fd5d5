//! Offline heuristic parser.
//!
//! Used when extraction fails for any reason. Derives priority, due date
//! and a cleaned-up title from the transcript with keyword and pattern
//! rules only, so a usable draft is always produced.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::domain::{truncate_title, NormalizedTaskDraft, Priority, Status, DEFAULT_TITLE};

use super::dates::scan_transcript;

/// Phrases that mark a task as high priority
pub const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "high priority",
    "urgent",
    "critical",
    "asap",
    "important",
    "immediately",
];

/// Phrases that mark a task as low priority.
///
/// Checked before the high set: several entries negate a high keyword.
pub const LOW_PRIORITY_KEYWORDS: &[&str] = &[
    "low priority",
    "not urgent",
    "not important",
    "whenever",
    "no rush",
];

static LEADING_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:create|add|new|make)\b\s*(?:an?\b\s*)?(?:task\b:?\s*)?").expect("valid regex")
});

static LEADING_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:remind me to|i need to|todo:?)(?:\s+|$)").expect("valid regex")
});

static TRAILING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\s,]+(?:by|before|on|next|this|due)\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|tomorrow|today|tonight|week|month)\b.*$",
    )
    .expect("valid regex")
});

static TRAILING_DAY: LazyLock<Regex> = LazyLock::new(|| {
    // Only a final day word, or one closing the clause before a comma.
    // "tomorrow's meeting" and "tomorrow about the claim" stay put.
    Regex::new(
        r"(?i)[\s,]+(?:tomorrow|today|tonight)(?:\s+(?:morning|afternoon|evening|night))?(?:[\s.!]*$|\s*,.*$)",
    )
    .expect("valid regex")
});

static PRIORITY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*,?\s*(?:(?:it's|its|it is|this is)\s+)?(?:(?:high|low|medium|top)\s+)?priority\b")
        .expect("valid regex")
});

static URGENCY_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*,\s*(?:(?:it's|its|it is|this is)\s+)?(?:very\s+)?(?:not urgent|urgent|critical|asap|important|no rush|whenever)\b.*$",
    )
    .expect("valid regex")
});

static URGENCY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s+(?:(?:it's|its|it is|this is)\s+)?(?:very\s+)?(?:not urgent|urgent|critical|asap|important|no rush|whenever)[\s.!]*$",
    )
    .expect("valid regex")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Build a draft from the transcript alone.
///
/// Cannot fail: every field has a rule-based value or a default.
/// Description is never inferred.
pub fn fallback_parse(transcript: &str, now: NaiveDateTime) -> NormalizedTaskDraft {
    NormalizedTaskDraft {
        transcript: transcript.to_string(),
        title: extract_title(transcript),
        description: None,
        priority: detect_priority(transcript),
        due_date: scan_transcript(transcript, now),
        status: Status::ToDo,
    }
}

/// Keyword-based priority detection, defaulting to `Medium`
pub fn detect_priority(transcript: &str) -> Priority {
    let lowered = transcript.to_lowercase();

    if LOW_PRIORITY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Priority::Low
    } else if HIGH_PRIORITY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Priority::High
    } else {
        Priority::Medium
    }
}

/// Derive a task title from a raw utterance.
///
/// Strips leading command phrases ("create a task", "remind me to") and
/// trailing date/priority phrases, capitalises the first letter and
/// enforces the length limit. Falls back to [`DEFAULT_TITLE`].
pub fn extract_title(transcript: &str) -> String {
    let title = transcript.trim();
    let title = LEADING_ACTION.replace(title, "");
    let title = LEADING_FILLER.replace(&title, "");
    let title = TRAILING_DATE.replace(&title, "");
    let title = TRAILING_DAY.replace(&title, "");
    let title = PRIORITY_PHRASE.replace(&title, " ");
    let title = URGENCY_CLAUSE.replace(&title, "");
    let title = URGENCY_SUFFIX.replace(&title, "");
    let title = WHITESPACE.replace_all(&title, " ");
    let title = title.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '!' | '-'));

    if title.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    truncate_title(&capitalize_first(title))
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_year() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_reminder_with_urgency_and_tomorrow() {
        let draft = fallback_parse("remind me to call mom tomorrow, it's urgent", new_year());

        assert_eq!(draft.title, "Call mom");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(
            draft.due_date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(draft.status, Status::ToDo);
        assert_eq!(draft.description, None);
        assert_eq!(draft.transcript, "remind me to call mom tomorrow, it's urgent");
    }

    #[test]
    fn test_priority_keywords() {
        assert_eq!(detect_priority("Fix the build ASAP"), Priority::High);
        assert_eq!(detect_priority("this is critical"), Priority::High);
        assert_eq!(detect_priority("clean garage whenever"), Priority::Low);
        assert_eq!(detect_priority("it's not urgent"), Priority::Low);
        assert_eq!(detect_priority("buy stamps"), Priority::Medium);
    }

    #[test]
    fn test_title_strips_leading_commands() {
        assert_eq!(extract_title("create a task review pull request"), "Review pull request");
        assert_eq!(extract_title("Add buy groceries"), "Buy groceries");
        assert_eq!(extract_title("todo: renew passport"), "Renew passport");
        assert_eq!(extract_title("I need to book flights"), "Book flights");
    }

    #[test]
    fn test_title_strips_trailing_date_and_priority() {
        assert_eq!(extract_title("submit expense report by friday"), "Submit expense report");
        assert_eq!(extract_title("prepare slides next monday high priority"), "Prepare slides");
        assert_eq!(extract_title("update the wiki, low priority"), "Update the wiki");
        assert_eq!(extract_title("email the landlord asap"), "Email the landlord");
    }

    #[test]
    fn test_title_keeps_mid_sentence_keywords() {
        assert_eq!(extract_title("prepare important documents for the audit"), "Prepare important documents for the audit");
    }

    #[test]
    fn test_title_keeps_possessive_day_words() {
        assert_eq!(extract_title("prepare for tomorrow's meeting"), "Prepare for tomorrow's meeting");
        assert_eq!(extract_title("review today's sales numbers"), "Review today's sales numbers");
    }

    #[test]
    fn test_title_keeps_mid_sentence_day_words() {
        assert_eq!(
            extract_title("call mom tomorrow about the insurance claim"),
            "Call mom tomorrow about the insurance claim"
        );
        assert_eq!(extract_title("call mom tomorrow, it's urgent"), "Call mom");
        assert_eq!(extract_title("water the plants tonight."), "Water the plants");
        assert_eq!(extract_title("stretch tomorrow morning"), "Stretch");
    }

    #[test]
    fn test_title_default_when_empty() {
        assert_eq!(extract_title("create a task"), DEFAULT_TITLE);
        assert_eq!(extract_title("remind me to"), DEFAULT_TITLE);
        assert_eq!(extract_title("   "), DEFAULT_TITLE);
    }

    #[test]
    fn test_title_truncated() {
        let transcript = format!("remind me to {}", "write ".repeat(40));
        let title = extract_title(&transcript);
        assert_eq!(title.chars().count(), 100);
        assert!(title.starts_with("Write write"));
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_fallback_weekday_date() {
        let draft = fallback_parse("pay invoices on thursday", new_year());
        assert_eq!(
            draft.due_date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 4)
        );
        assert_eq!(draft.priority, Priority::Medium);
    }

    #[test]
    fn test_fallback_without_date() {
        let draft = fallback_parse("buy milk", new_year());
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.due_date, None);
    }
}
