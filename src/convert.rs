//! Turning a parse result into a task-creation record

use crate::parser::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::text::{ELLIPSIS, char_len, clip, take_chars, truncate_with_ellipsis};
use crate::types::{ConvertOptions, CreateTodoInput, EmailParseResult, EmailTask, TodoStatus};

/// Heading of the block that quotes the source email
pub const ORIGINAL_EMAIL_MARKER: &str = "--- Original Email ---";

/// Slack kept between a shortened description and the quoted email
const QUOTE_MARGIN: usize = 20;

/// Description length kept when even the quoted email has to be shortened
const MIN_DESCRIPTION_CHARS: usize = 200;

const QUOTED_SUBJECT_CHARS: usize = 50;
const QUOTED_SENDER_CHARS: usize = 50;
const QUOTED_BODY_CHARS: usize = 150;

/// Merge `parse_result` with the caller's overrides into a new task record.
///
/// Empty string overrides count as absent. The title never exceeds 190
/// characters and the description never exceeds 500, with or without the
/// quoted original email.
#[must_use]
pub fn convert_to_todo_input(
    email: &EmailTask,
    parse_result: &EmailParseResult,
    options: &ConvertOptions,
) -> CreateTodoInput {
    let title = non_empty(options.custom_title.as_deref())
        .unwrap_or(&parse_result.suggested_title);
    let description = non_empty(options.custom_description.as_deref())
        .unwrap_or(&parse_result.suggested_description);

    let description = if options.include_original_email {
        append_original_email(description, email)
    } else {
        truncate_with_ellipsis(description, MAX_DESCRIPTION_CHARS)
    };

    CreateTodoInput {
        title: truncate_with_ellipsis(title, MAX_TITLE_CHARS),
        description: Some(description),
        priority: options
            .custom_priority
            .unwrap_or(parse_result.suggested_priority),
        status: TodoStatus::New,
        due_date: options.custom_due_date.or(parse_result.suggested_due_date),
        tags: options
            .custom_tags
            .clone()
            .unwrap_or_else(|| parse_result.suggested_tags.clone()),
        is_recurring: false,
        recurring_config: None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn quote_block(subject: &str, sender: &str, content: &str) -> String {
    format!("\n\n{ORIGINAL_EMAIL_MARKER}\nSubject: {subject}\nFrom: {sender}\n\n{content}")
}

fn append_original_email(description: &str, email: &EmailTask) -> String {
    let block = quote_block(&email.subject, &email.sender, &email.content);
    if char_len(description) + char_len(&block) <= MAX_DESCRIPTION_CHARS {
        return format!("{description}{block}");
    }

    // Shrink the description first so the quote survives whole
    let available = MAX_DESCRIPTION_CHARS.saturating_sub(char_len(&block) + QUOTE_MARGIN);
    let assembled = if available > 0 {
        format!(
            "{}{ELLIPSIS}{block}",
            take_chars(description, available).trim()
        )
    } else {
        let block = quote_block(
            &clip(&email.subject, QUOTED_SUBJECT_CHARS),
            &clip(&email.sender, QUOTED_SENDER_CHARS),
            &clip(&email.content, QUOTED_BODY_CHARS),
        );
        let keep = MAX_DESCRIPTION_CHARS
            .saturating_sub(char_len(&block) + ELLIPSIS.len())
            .min(MIN_DESCRIPTION_CHARS);
        format!("{}{ELLIPSIS}{block}", take_chars(description, keep).trim())
    };

    truncate_with_ellipsis(&assembled, MAX_DESCRIPTION_CHARS)
}
