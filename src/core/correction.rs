//! Deterministic due-date correction.
//!
//! Generative extraction is unreliable at weekday arithmetic relative to
//! today, so for the narrow `next|by|on <weekday>` / `tomorrow` vocabulary
//! the rule table in [`super::dates`] is authoritative.

use chrono::NaiveDateTime;
use tracing::debug;

use super::dates::scan_transcript;

/// Override the extracted due date when a rule matches the transcript.
///
/// On a match the rule's date replaces `candidate` outright; otherwise the
/// candidate passes through unchanged. Never fails.
pub fn correct_due_date(
    transcript: &str,
    candidate: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match scan_transcript(transcript, now) {
        Some(corrected) => {
            if candidate != Some(corrected) {
                debug!(?candidate, %corrected, "Overriding extracted due date");
            }
            Some(corrected)
        }
        None => candidate,
    }
}
