//! Date rules for the task-creation vocabulary.
//!
//! The rule table is evaluated in a fixed order: `next|by|on <weekday>`
//! for Monday through Sunday, then a bare `tomorrow`. The first rule whose
//! pattern matches the transcript decides the date.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;

/// Weekdays in rule order
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// What a matched rule resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTarget {
    /// Next future occurrence of the weekday, never today
    Weekday(Weekday),
    /// The day after today
    Tomorrow,
}

impl DateTarget {
    /// Resolve against `now`, at end of day
    pub fn resolve(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        let day = match self {
            DateTarget::Weekday(weekday) => next_weekday(today, *weekday),
            DateTarget::Tomorrow => today + Duration::days(1),
        };
        end_of_day(day)
    }
}

/// A transcript pattern paired with the date it stands for
#[derive(Debug)]
pub struct CorrectionRule {
    pub pattern: Regex,
    pub target: DateTarget,
}

impl CorrectionRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.pattern.is_match(lowered)
    }
}

static RULES: LazyLock<Vec<CorrectionRule>> = LazyLock::new(|| {
    let mut rules: Vec<CorrectionRule> = WEEKDAYS
        .iter()
        .map(|weekday| CorrectionRule {
            pattern: Regex::new(&format!(r"\b(?:next|by|on)\s+{}", weekday_name(*weekday).to_lowercase()))
                .expect("valid regex"),
            target: DateTarget::Weekday(*weekday),
        })
        .collect();

    rules.push(CorrectionRule {
        pattern: Regex::new("tomorrow").expect("valid regex"),
        target: DateTarget::Tomorrow,
    });

    rules
});

/// The ordered rule table
pub fn rules() -> &'static [CorrectionRule] {
    &RULES
}

/// Scan a transcript for the first matching rule and resolve it.
///
/// Matching is case-insensitive. Returns `None` when no rule applies.
pub fn scan_transcript(transcript: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let lowered = transcript.to_lowercase();
    rules()
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.target.resolve(now))
}

/// Next occurrence of `weekday` strictly after `today`
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    today + Duration::days(ahead)
}

/// 23:59:59.999 on `day`
pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN))
}

/// English weekday name, capitalised
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
