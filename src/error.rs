//! Error types for task extraction and recurrence scheduling

use thiserror::Error;

/// Errors raised by the recurrence engine and the ingestion helpers.
///
/// Email parsing itself never fails; sparse input only lowers confidence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Recurrence type outside daily/weekly/monthly/yearly
    #[error("Unsupported recurring type: {0}")]
    UnknownRecurrenceType(String),

    /// Task lacks what is needed to spawn its next occurrence
    #[error("Todo is not properly configured for recurring: {0}")]
    NotRecurring(String),

    /// Date arithmetic overflowed the supported calendar range
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    /// Raw recurrence config failed validation
    #[error("Invalid recurring config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// Failed to parse a raw email message
    #[error("Failed to parse email structure: {0}")]
    Structure(String),

    /// Bulk import exceeded the batch cap
    #[error("Maximum {max} emails can be processed at once, got {count}")]
    BatchTooLarge { count: usize, max: usize },

    /// Bulk import with nothing to import
    #[error("Invalid emails array: batch is empty")]
    EmptyBatch,
}

/// Result type for task operations
pub type Result<T> = std::result::Result<T, TaskError>;
