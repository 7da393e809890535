//! Recurring task scheduling
//!
//! Pure date arithmetic over a [`RecurringConfig`]: computing the next
//! occurrence, deciding whether an end date still allows it, and building the
//! field values of the next task instance. Nothing here touches storage.

use crate::error::{Result, TaskError};
use crate::types::{Todo, TodoSkeleton, TodoStatus};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Inclusive bounds on a recurrence interval
pub const MIN_INTERVAL: u32 = 1;
pub const MAX_INTERVAL: u32 = 365;

/// Weekdays indexed by their 0 = Sunday number
const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// How often a task repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    const fn unit(self, plural: bool) -> &'static str {
        match (self, plural) {
            (Self::Daily, false) => "day",
            (Self::Daily, true) => "days",
            (Self::Weekly, false) => "week",
            (Self::Weekly, true) => "weeks",
            (Self::Monthly, false) => "month",
            (Self::Monthly, true) => "months",
            (Self::Yearly, false) => "year",
            (Self::Yearly, true) => "years",
        }
    }
}

impl FromStr for RecurrenceKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(TaskError::UnknownRecurrenceType(other.to_string())),
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated recurrence rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringConfig {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,

    /// Every `interval` days/weeks/months/years
    pub interval: u32,

    /// Weekly only: the weekdays the task lands on
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "weekday_numbers"
    )]
    pub days_of_week: Option<Vec<Weekday>>,

    /// Monthly only: 1..=31, clamped to the length of the target month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,

    /// No occurrence is scheduled after this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<DateTime<Utc>>,
}

impl RecurringConfig {
    #[must_use]
    pub const fn new(kind: RecurrenceKind, interval: u32) -> Self {
        Self {
            kind,
            interval,
            days_of_week: None,
            day_of_month: None,
            end_date: None,
            next_due_date: None,
        }
    }

    #[must_use]
    pub const fn daily(interval: u32) -> Self {
        Self::new(RecurrenceKind::Daily, interval)
    }

    #[must_use]
    pub fn weekly(interval: u32, days: impl IntoIterator<Item = Weekday>) -> Self {
        let days: Vec<Weekday> = days.into_iter().collect();
        Self {
            days_of_week: if days.is_empty() { None } else { Some(days) },
            ..Self::new(RecurrenceKind::Weekly, interval)
        }
    }

    #[must_use]
    pub fn monthly(interval: u32, day_of_month: Option<u32>) -> Self {
        Self {
            day_of_month,
            ..Self::new(RecurrenceKind::Monthly, interval)
        }
    }

    #[must_use]
    pub const fn yearly(interval: u32) -> Self {
        Self::new(RecurrenceKind::Yearly, interval)
    }

    #[must_use]
    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Check this rule as a form submission at `now`
    #[must_use]
    pub fn validate_at(&self, now: DateTime<Utc>) -> ValidationReport {
        RecurringConfigInput::from(self).validate_at(now)
    }
}

impl fmt::Display for RecurringConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&recurring_description(self))
    }
}

/// Next occurrence after `current_due_date`, keeping its time of day.
///
/// Weekly rules with selected days move to the next selected day later in
/// the same week, or wrap to the first selected day `interval` weeks on.
/// Monthly rules with a day of month clamp to the last day of a shorter
/// target month (Jan 31 monthly lands on Feb 28/29). A day of month of 0
/// counts as unset.
pub fn calculate_next_due_date(
    config: &RecurringConfig,
    current_due_date: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let interval = config.interval;
    let next = match config.kind {
        RecurrenceKind::Daily => current_due_date.checked_add_days(Days::new(u64::from(interval))),
        RecurrenceKind::Weekly => match config.days_of_week.as_deref() {
            Some(days) if !days.is_empty() => {
                let ahead = days_until_next_selected(current_due_date.weekday(), days, interval);
                current_due_date.checked_add_days(Days::new(ahead))
            }
            _ => current_due_date.checked_add_days(Days::new(7 * u64::from(interval))),
        },
        RecurrenceKind::Monthly => match config.day_of_month.filter(|&day| day > 0) {
            Some(day) => monthly_on_day(current_due_date, interval, day),
            None => current_due_date.checked_add_months(Months::new(interval)),
        },
        RecurrenceKind::Yearly => interval
            .checked_mul(12)
            .and_then(|months| current_due_date.checked_add_months(Months::new(months))),
    };

    let next = next.ok_or_else(|| {
        TaskError::DateOutOfRange(format!(
            "{} recurrence every {interval} from {current_due_date}",
            config.kind
        ))
    })?;
    debug!("Next {} occurrence after {current_due_date}: {next}", config.kind);
    Ok(next)
}

fn days_until_next_selected(current: Weekday, selected: &[Weekday], interval: u32) -> u64 {
    let current = u64::from(current.num_days_from_sunday());
    let mut days: Vec<u64> = selected
        .iter()
        .map(|day| u64::from(day.num_days_from_sunday()))
        .collect();
    days.sort_unstable();

    match days.iter().find(|&&day| day > current) {
        Some(&day) => day - current,
        None => 7 - current + days[0] + 7 * u64::from(interval.saturating_sub(1)),
    }
}

fn monthly_on_day(current: DateTime<Utc>, interval: u32, day: u32) -> Option<DateTime<Utc>> {
    let first = NaiveDate::from_ymd_opt(current.year(), current.month(), 1)?;
    let target_month = first.checked_add_months(Months::new(interval))?;
    let last_day = target_month
        .checked_add_months(Months::new(1))?
        .pred_opt()?
        .day();
    let date = target_month.with_day(day.min(last_day))?;
    Some(date.and_time(current.time()).and_utc())
}

/// Whether the occurrence after `current_due_date` still falls on or before the end date
pub fn should_create_next_instance(
    config: &RecurringConfig,
    current_due_date: DateTime<Utc>,
) -> Result<bool> {
    let Some(end_date) = config.end_date else {
        return Ok(true);
    };
    Ok(calculate_next_due_date(config, current_due_date)? <= end_date)
}

/// Field values for the occurrence following `original`.
///
/// The original task is left untouched; the skeleton points back at it via
/// `parent_todo_id` and has no storage id of its own.
pub fn create_next_instance(original: &Todo) -> Result<TodoSkeleton> {
    if !original.is_recurring {
        return Err(TaskError::NotRecurring("isRecurring is not set".into()));
    }
    let config = original
        .recurring_config
        .as_ref()
        .ok_or_else(|| TaskError::NotRecurring("missing recurringConfig".into()))?;
    let due_date = original
        .due_date
        .ok_or_else(|| TaskError::NotRecurring("missing dueDate".into()))?;

    Ok(TodoSkeleton {
        user_id: original.user_id.clone(),
        title: original.title.clone(),
        description: original.description.clone(),
        priority: original.priority,
        tags: original.tags.clone(),
        is_recurring: true,
        recurring_config: config.clone(),
        parent_todo_id: original.id.clone(),
        due_date: calculate_next_due_date(config, due_date)?,
        status: TodoStatus::New,
        completed: false,
    })
}

/// What to insert when `todo` has just been completed.
///
/// `None` for one-off tasks, tasks without a due date, and recurrences whose
/// end date rules out another occurrence.
pub fn next_instance_on_completion(todo: &Todo) -> Result<Option<TodoSkeleton>> {
    let (true, Some(config), Some(due_date)) =
        (todo.is_recurring, todo.recurring_config.as_ref(), todo.due_date)
    else {
        return Ok(None);
    };

    if !should_create_next_instance(config, due_date)? {
        debug!(
            "Recurrence of {:?} ended: next occurrence after {due_date} is past {:?}",
            todo.title, config.end_date
        );
        return Ok(None);
    }
    create_next_instance(todo).map(Some)
}

/// Human-readable rendering, e.g. `Repeats every 2 weeks on Mon, Wed until 1/1/2025`
#[must_use]
pub fn recurring_description(config: &RecurringConfig) -> String {
    let mut description = String::from("Repeats every ");
    if config.interval > 1 {
        description.push_str(&format!("{} ", config.interval));
    }
    description.push_str(config.kind.unit(config.interval != 1));

    match config.kind {
        RecurrenceKind::Weekly => {
            if let Some(days) = config.days_of_week.as_deref().filter(|d| !d.is_empty()) {
                let names: Vec<&str> = days
                    .iter()
                    .map(|day| DAY_NAMES[day.num_days_from_sunday() as usize])
                    .collect();
                description.push_str(&format!(" on {}", names.join(", ")));
            }
        }
        RecurrenceKind::Monthly => {
            if let Some(day) = config.day_of_month.filter(|&day| day > 0) {
                description.push_str(&format!(" on day {day}"));
            }
        }
        RecurrenceKind::Daily | RecurrenceKind::Yearly => {}
    }

    if let Some(end_date) = config.end_date {
        description.push_str(&format!(" until {}", end_date.format("%-m/%-d/%Y")));
    }

    description
}

/// Outcome of checking a recurrence rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,

    /// Every violation found, in check order
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// A recurrence rule as submitted by a form or API client, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringConfigInput {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default = "default_interval")]
    pub interval: i64,

    #[serde(default)]
    pub days_of_week: Option<Vec<i64>>,

    #[serde(default)]
    pub day_of_month: Option<i64>,

    /// RFC 3339 timestamp or `YYYY-MM-DD`
    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    pub next_due_date: Option<DateTime<Utc>>,
}

const fn default_interval() -> i64 {
    1
}

impl RecurringConfigInput {
    /// Check the rule against the current time
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        self.validate_at(Utc::now())
    }

    /// Check the rule, collecting every violation; an end date before `now` is one
    #[must_use]
    pub fn validate_at(&self, now: DateTime<Utc>) -> ValidationReport {
        let mut errors = Vec::new();
        if self.kind.parse::<RecurrenceKind>().is_err() {
            errors.push("Invalid recurring type".to_string());
        }
        errors.extend(self.shape_errors());
        if let Some(end_date) = self.end_date.as_deref().and_then(parse_end_date)
            && end_date < now
        {
            errors.push("End date cannot be in the past".to_string());
        }
        ValidationReport::from_errors(errors)
    }

    /// Violations that hold regardless of the current time
    fn shape_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let kind = self.kind.parse::<RecurrenceKind>().ok();

        if !(i64::from(MIN_INTERVAL)..=i64::from(MAX_INTERVAL)).contains(&self.interval) {
            errors.push(format!(
                "Interval must be between {MIN_INTERVAL} and {MAX_INTERVAL}"
            ));
        }

        if kind == Some(RecurrenceKind::Weekly)
            && let Some(days) = &self.days_of_week
        {
            if days.is_empty() {
                errors.push("At least one day must be selected for weekly recurrence".to_string());
            }
            if days.iter().any(|&day| weekday_from_number(day).is_none()) {
                errors.push("Invalid day of week values".to_string());
            }
        }

        if kind == Some(RecurrenceKind::Monthly)
            && let Some(day) = self.day_of_month
            && !(1..=31).contains(&day)
        {
            errors.push("Day of month must be between 1 and 31".to_string());
        }

        if let Some(end_date) = &self.end_date
            && parse_end_date(end_date).is_none()
        {
            errors.push("Invalid end date".to_string());
        }

        errors
    }
}

/// Non-throwing check of a submitted rule against the current time
#[must_use]
pub fn validate_recurring_config(config: &RecurringConfigInput) -> ValidationReport {
    config.validate()
}

impl TryFrom<RecurringConfigInput> for RecurringConfig {
    type Error = TaskError;

    /// Unknown types fail with [`TaskError::UnknownRecurrenceType`]; other
    /// shape violations are collected into [`TaskError::InvalidConfig`].
    /// End dates already in the past are accepted so stored rules load.
    fn try_from(input: RecurringConfigInput) -> Result<Self> {
        let kind: RecurrenceKind = input.kind.parse()?;
        let errors = input.shape_errors();
        if !errors.is_empty() {
            return Err(TaskError::InvalidConfig(errors));
        }

        let in_range = |value: i64| u32::try_from(value).ok();
        Ok(Self {
            kind,
            interval: in_range(input.interval).unwrap_or(MIN_INTERVAL),
            days_of_week: match kind {
                RecurrenceKind::Weekly => input
                    .days_of_week
                    .map(|days| days.into_iter().filter_map(weekday_from_number).collect()),
                _ => None,
            },
            day_of_month: match kind {
                RecurrenceKind::Monthly => input.day_of_month.and_then(in_range),
                _ => None,
            },
            end_date: input.end_date.as_deref().and_then(parse_end_date),
            next_due_date: input.next_due_date,
        })
    }
}

impl From<&RecurringConfig> for RecurringConfigInput {
    fn from(config: &RecurringConfig) -> Self {
        Self {
            kind: config.kind.as_str().to_string(),
            interval: i64::from(config.interval),
            days_of_week: config.days_of_week.as_ref().map(|days| {
                days.iter()
                    .map(|day| i64::from(day.num_days_from_sunday()))
                    .collect()
            }),
            day_of_month: config.day_of_month.map(i64::from),
            end_date: config.end_date.map(|end| end.to_rfc3339()),
            next_due_date: config.next_due_date,
        }
    }
}

/// 0 = Sunday through 6 = Saturday
#[must_use]
pub fn weekday_from_number(day: i64) -> Option<Weekday> {
    usize::try_from(day).ok().and_then(|idx| WEEK.get(idx).copied())
}

fn parse_end_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

/// Weekdays on the wire as 0 (Sunday) ..= 6 (Saturday)
mod weekday_numbers {
    use super::weekday_from_number;
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        days: &Option<Vec<Weekday>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        days.as_ref()
            .map(|days| {
                days.iter()
                    .map(Weekday::num_days_from_sunday)
                    .collect::<Vec<_>>()
            })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Weekday>>, D::Error> {
        Option::<Vec<i64>>::deserialize(deserializer)?
            .map(|days| {
                days.into_iter()
                    .map(|day| {
                        weekday_from_number(day)
                            .ok_or_else(|| D::Error::custom(format!("invalid day of week {day}")))
                    })
                    .collect()
            })
            .transpose()
    }
}
