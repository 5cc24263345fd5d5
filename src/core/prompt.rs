//! Extraction prompt construction.
//!
//! The prompt carries literal resolved dates for "tomorrow" and every
//! "next <weekday>" phrase, so the model copies dates instead of computing
//! them. Output is a pure function of `(transcript, now)`.

use chrono::{Datelike, Duration, NaiveDateTime};

use super::dates::{next_weekday, weekday_name, WEEKDAYS};

/// Keys the model must return, in order
pub const RESPONSE_KEYS: [&str; 5] = ["title", "description", "priority", "dueDate", "status"];

/// Build the extraction instruction for a transcript
pub fn build_prompt(transcript: &str, now: NaiveDateTime) -> String {
    let today = now.date();
    let tomorrow = today + Duration::days(1);

    let weekday_rules: String = WEEKDAYS
        .iter()
        .map(|weekday| {
            format!(
                "- \"next {}\" → {}\n",
                weekday_name(*weekday),
                next_weekday(today, *weekday).format("%Y-%m-%d")
            )
        })
        .collect();

    format!(
        r#"You are an AI assistant extracting task details.
Today: {today} ({day_name})
Input: "{transcript}"

PRIORITY RULES:
- High: "urgent", "critical", "asap", "important", "high priority", "immediately"
- Low: "low priority", "whenever", "not urgent", "no rush"
- Medium: Default

DATE RULES (IMPORTANT - Use these exact dates):
- "tomorrow" → {tomorrow}
{weekday_rules}- "in X days" → Add X days to today
- "by [Day]" → Use the next occurrence of that weekday
- Specific dates → YYYY-MM-DD
- None mentioned → null

TITLE RULES:
- Remove: "create", "add", "remind me to", "i need to", "todo"
- No date/priority in title
- Under 100 chars

Return ONLY JSON:
{{
  "title": "string",
  "description": "string|null",
  "priority": "Low|Medium|High",
  "dueDate": "YYYY-MM-DD|null",
  "status": "To Do|In Progress|Done"
}}"#,
        today = today.format("%Y-%m-%d"),
        day_name = weekday_name(today.weekday()),
        transcript = transcript,
        tomorrow = tomorrow.format("%Y-%m-%d"),
        weekday_rules = weekday_rules,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        // Friday
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(17, 45, 0)
            .unwrap()
    }

    #[test]
    fn test_prompt_embeds_today() {
        let prompt = build_prompt("buy milk", now());
        assert!(prompt.contains("Today: 2024-01-05 (Friday)"));
        assert!(prompt.contains("Input: \"buy milk\""));
    }

    #[test]
    fn test_prompt_embeds_resolved_dates() {
        let prompt = build_prompt("buy milk", now());
        assert!(prompt.contains("\"tomorrow\" → 2024-01-06"));
        assert!(prompt.contains("\"next Monday\" → 2024-01-08"));
        assert!(prompt.contains("\"next Thursday\" → 2024-01-11"));
        // Same weekday as today resolves a week out
        assert!(prompt.contains("\"next Friday\" → 2024-01-12"));
        assert!(prompt.contains("\"next Sunday\" → 2024-01-07"));
    }

    #[test]
    fn test_prompt_requests_fixed_keys() {
        let prompt = build_prompt("buy milk", now());
        assert!(prompt.contains("Return ONLY JSON"));
        for key in RESPONSE_KEYS {
            assert!(prompt.contains(&format!("\"{}\":", key)), "missing key {}", key);
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("remind me to call mom tomorrow", now());
        let b = build_prompt("remind me to call mom tomorrow", now());
        assert_eq!(a, b);

        let later = build_prompt("remind me to call mom tomorrow", now() + Duration::days(1));
        assert_ne!(a, later);
    }
}
