//! Bulk import planning for batches of emails

use crate::convert::convert_to_todo_input;
use crate::error::{Result, TaskError};
use crate::parser::parse_email_at;
use crate::types::{ConvertOptions, CreateTodoInput, EmailParseResult, EmailTask, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Import settings as sent by the ingestion client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    /// Quote the source email in each task description
    pub include_original_email: bool,

    /// Use the suggested priority; otherwise `default_priority`
    pub auto_set_priority: bool,

    /// Use the suggested due date; otherwise leave it unset
    pub auto_extract_due_date: bool,

    pub default_priority: Priority,

    /// Prefix every tag as `prefix:tag`
    pub tag_prefix: Option<String>,

    /// Emails scoring below this are skipped
    pub min_confidence: f64,

    pub max_batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            include_original_email: false,
            auto_set_priority: true,
            auto_extract_due_date: true,
            default_priority: Priority::Medium,
            tag_prefix: None,
            min_confidence: 0.3,
            max_batch_size: 50,
        }
    }
}

impl ImportOptions {
    /// Parse options from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn convert_options(&self, parse_result: &EmailParseResult) -> ConvertOptions {
        ConvertOptions {
            include_original_email: self.include_original_email,
            custom_priority: (!self.auto_set_priority).then_some(self.default_priority),
            custom_tags: self.tag_prefix.as_deref().map(|prefix| {
                parse_result
                    .suggested_tags
                    .iter()
                    .map(|tag| format!("{prefix}:{tag}"))
                    .collect()
            }),
            ..ConvertOptions::default()
        }
    }
}

/// An email turned into a task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedEmail {
    pub email_id: String,
    pub subject: String,
    pub todo: CreateTodoInput,
    pub parse_result: EmailParseResult,
}

/// An email left out of the import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEmail {
    pub email_id: String,
    pub subject: String,
    pub reason: String,
    pub confidence: f64,
}

/// Which emails of a batch become tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPlan {
    pub accepted: Vec<ImportedEmail>,
    pub skipped: Vec<SkippedEmail>,
}

impl ImportPlan {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.accepted.len() + self.skipped.len()
    }
}

/// Parse a batch and decide which emails become tasks.
///
/// Fails only on the batch itself (empty, or larger than
/// `max_batch_size`); individual emails are never rejected with an error,
/// just skipped when their confidence is below `min_confidence`.
pub fn plan_bulk_import(
    emails: &[EmailTask],
    options: &ImportOptions,
    now: DateTime<Utc>,
) -> Result<ImportPlan> {
    if emails.is_empty() {
        return Err(TaskError::EmptyBatch);
    }
    if emails.len() > options.max_batch_size {
        return Err(TaskError::BatchTooLarge {
            count: emails.len(),
            max: options.max_batch_size,
        });
    }

    let mut plan = ImportPlan::default();
    for email in emails {
        let parse_result = parse_email_at(email, now);
        if parse_result.confidence < options.min_confidence {
            debug!(
                "Skipping email {}: confidence {} below {}",
                email.id, parse_result.confidence, options.min_confidence
            );
            plan.skipped.push(SkippedEmail {
                email_id: email.id.clone(),
                subject: email.subject.clone(),
                reason: "Low confidence score".to_string(),
                confidence: parse_result.confidence,
            });
            continue;
        }

        let mut todo =
            convert_to_todo_input(email, &parse_result, &options.convert_options(&parse_result));
        if !options.auto_extract_due_date {
            todo.due_date = None;
        }
        plan.accepted.push(ImportedEmail {
            email_id: email.id.clone(),
            subject: email.subject.clone(),
            todo,
            parse_result,
        });
    }

    Ok(plan)
}
