// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Inbox Tasks
//!
//! Turns unstructured emails into task suggestions and projects the schedule
//! of recurring tasks.
//!
//! # Features
//!
//! - Title, description, priority, due date and tag suggestions from an email
//! - Heuristic confidence score for each suggestion
//! - Conversion into a task-creation record with length limits enforced
//! - Next-occurrence computation for daily, weekly, monthly and yearly rules
//! - Validation and human-readable descriptions of recurrence rules
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use inbox_tasks::{EmailTask, Priority, parse_email};
//!
//! let email = EmailTask::new(
//!     "1",
//!     "URGENT: Fix production bug ASAP",
//!     "admin@company.com",
//!     "We have a critical bug in production. Please fix this by end of day.",
//!     Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
//! );
//! let result = parse_email(&email);
//!
//! assert_eq!(result.suggested_priority, Priority::High);
//! assert!(result.suggested_tags.contains(&"company.com".to_string()));
//! ```

mod convert;
mod error;
mod import;
mod keywords;
mod mime;
mod parser;
mod recurrence;
mod text;
mod types;

pub use convert::{ORIGINAL_EMAIL_MARKER, convert_to_todo_input};
pub use error::{Result, TaskError};
pub use import::{ImportOptions, ImportPlan, ImportedEmail, SkippedEmail, plan_bulk_import};
pub use parser::{
    FALLBACK_TITLE, MAX_DESCRIPTION_CHARS, MAX_TAGS, MAX_TITLE_CHARS, parse_email, parse_email_at,
};
pub use recurrence::{
    MAX_INTERVAL, MIN_INTERVAL, RecurrenceKind, RecurringConfig, RecurringConfigInput,
    ValidationReport, calculate_next_due_date, create_next_instance, next_instance_on_completion,
    recurring_description, should_create_next_instance, validate_recurring_config,
    weekday_from_number,
};
pub use types::*;
