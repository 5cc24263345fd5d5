//! Task priority and status vocabularies.
//!
//! Both enums serialize to the labels the task service stores
//! (`"High"`, `"In Progress"`, ...). Model output is mapped through the
//! lenient `from_model_token` constructors, which never fail.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Priority of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Map a free-form token to a priority.
    ///
    /// Case-insensitive and trimmed; anything other than `high` or `low`
    /// (including no token at all) is `Medium`.
    pub fn from_model_token(token: Option<&str>) -> Self {
        match token.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("high") => Priority::High,
            Some("low") => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl Status {
    /// Map a free-form token to a status.
    ///
    /// `in progress` and `done` are recognised (case-insensitive, trimmed);
    /// everything else is `ToDo`.
    pub fn from_model_token(token: Option<&str>) -> Self {
        match token.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("in progress") => Status::InProgress,
            Some("done") => Status::Done,
            _ => Status::ToDo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
