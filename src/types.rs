//! Core types shared by the email parser, the converter and the recurrence engine

use crate::recurrence::RecurringConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An email submitted for conversion into a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTask {
    /// Caller-assigned identifier
    pub id: String,

    /// Subject line as received
    pub subject: String,

    /// Sender, either `user@domain` or `Name <user@domain>`
    pub sender: String,

    /// Plain-text body
    pub content: String,

    /// When the email arrived
    pub received_at: DateTime<Utc>,

    /// Attachment metadata
    #[serde(default)]
    pub attachments: Vec<EmailAttachment>,
}

impl EmailTask {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            sender: sender.into(),
            content: content.into(),
            received_at,
            attachments: Vec::new(),
        }
    }

    /// Domain part of the sender address, if it has one
    #[must_use]
    pub fn sender_domain(&self) -> Option<&str> {
        let (_, domain) = self.sender.rsplit_once('@')?;
        let domain = domain.trim_end_matches('>').trim();
        if domain.is_empty() { None } else { Some(domain) }
    }

    /// Lower-cased `subject content`, the text every keyword scan runs over
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.subject, self.content).to_lowercase()
    }
}

/// Attachment metadata carried alongside an email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub name: String,

    /// MIME type, e.g. `application/pdf`
    #[serde(rename = "type")]
    pub mime_type: String,

    /// Size in bytes
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status of a task.
///
/// Boards may define their own columns, so anything outside the three
/// built-in states is kept verbatim as `Custom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TodoStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Custom(String),
}

impl TodoStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "new",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Custom(column) => column,
        }
    }
}

impl From<String> for TodoStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "new" => Self::New,
            "in-progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Custom(value),
        }
    }
}

impl From<TodoStatus> for String {
    fn from(status: TodoStatus) -> Self {
        match status {
            TodoStatus::Custom(column) => column,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task metadata suggested for an email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailParseResult {
    /// At most 190 characters
    pub suggested_title: String,

    /// Sender/received header plus trimmed body, at most 500 characters
    pub suggested_description: String,

    pub suggested_priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_due_date: Option<DateTime<Utc>>,

    /// Unique, at most five
    pub suggested_tags: Vec<String>,

    /// Heuristic certainty in `[0, 1]`
    pub confidence: f64,
}

/// Caller overrides applied when turning a parse result into a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Append an `--- Original Email ---` block to the description
    pub include_original_email: bool,
    pub custom_title: Option<String>,
    pub custom_description: Option<String>,
    pub custom_priority: Option<Priority>,
    pub custom_due_date: Option<DateTime<Utc>>,
    pub custom_tags: Option<Vec<String>>,
}

/// Record handed to the task-creation collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoInput {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub priority: Priority,

    pub status: TodoStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_config: Option<RecurringConfig>,
}

/// A persisted task, as read back from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Storage identifier
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub user_id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub status: TodoStatus,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_config: Option<RecurringConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_todo_id: Option<String>,
}

/// Field values for the next occurrence of a recurring task.
///
/// Carries no storage id: inserting it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoSkeleton {
    pub user_id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub priority: Priority,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub recurring_config: RecurringConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_todo_id: Option<String>,

    pub due_date: DateTime<Utc>,
    pub status: TodoStatus,
    pub completed: bool,
}
