use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use inbox_tasks::*;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
}

fn recurring_todo(config: RecurringConfig, due: DateTime<Utc>) -> Todo {
    Todo {
        id: Some("todo-1".into()),
        user_id: "user-42".into(),
        title: "Water the plants".into(),
        description: Some("Both balconies".into()),
        completed: true,
        status: TodoStatus::Completed,
        priority: Priority::Low,
        due_date: Some(due),
        tags: vec!["home".into()],
        is_recurring: true,
        recurring_config: Some(config),
        parent_todo_id: None,
    }
}

fn input(json: &str) -> RecurringConfigInput {
    serde_json::from_str(json).unwrap()
}

// --- calculate_next_due_date ---

#[test]
fn test_daily() {
    let next = calculate_next_due_date(&RecurringConfig::daily(3), at(2024, 1, 30)).unwrap();
    assert_eq!(next, at(2024, 2, 2));
}

#[test]
fn test_weekly_same_single_day_advances_a_week() {
    // 2024-01-15 is a Monday
    let config = RecurringConfig::weekly(1, [Weekday::Mon]);
    let next = calculate_next_due_date(&config, at(2024, 1, 15)).unwrap();
    assert_eq!(next, at(2024, 1, 22));
}

#[test]
fn test_weekly_later_day_same_week() {
    let config = RecurringConfig::weekly(1, [Weekday::Mon, Weekday::Wed, Weekday::Fri]);
    let next = calculate_next_due_date(&config, at(2024, 1, 17)).unwrap();
    assert_eq!(next, at(2024, 1, 19));
}

#[test]
fn test_weekly_unsorted_days() {
    let config = RecurringConfig::weekly(1, [Weekday::Fri, Weekday::Mon]);
    let next = calculate_next_due_date(&config, at(2024, 1, 16)).unwrap();
    assert_eq!(next, at(2024, 1, 19));
}

#[test]
fn test_weekly_wrap_skips_interval_weeks() {
    let config = RecurringConfig::weekly(2, [Weekday::Mon, Weekday::Wed]);
    // Friday; no selected day left this week
    let next = calculate_next_due_date(&config, at(2024, 1, 19)).unwrap();
    assert_eq!(next, at(2024, 1, 29));
}

#[test]
fn test_weekly_without_days() {
    let config = RecurringConfig::weekly(2, Vec::<Weekday>::new());
    assert!(config.days_of_week.is_none());
    let next = calculate_next_due_date(&config, at(2024, 1, 17)).unwrap();
    assert_eq!(next, at(2024, 1, 31));
}

#[test]
fn test_monthly_clamps_to_end_of_february() {
    let config = RecurringConfig::monthly(1, Some(31));
    assert_eq!(
        calculate_next_due_date(&config, at(2023, 1, 31)).unwrap(),
        at(2023, 2, 28)
    );
    assert_eq!(
        calculate_next_due_date(&config, at(2024, 1, 31)).unwrap(),
        at(2024, 2, 29)
    );
}

#[test]
fn test_monthly_on_first() {
    let config = RecurringConfig::monthly(1, Some(1));
    let next = calculate_next_due_date(&config, at(2024, 1, 1)).unwrap();
    assert_eq!(next, at(2024, 2, 1));
}

#[test]
fn test_monthly_crosses_year() {
    let config = RecurringConfig::monthly(3, Some(15));
    let next = calculate_next_due_date(&config, at(2024, 11, 15)).unwrap();
    assert_eq!(next, at(2025, 2, 15));
}

#[test]
fn test_monthly_moves_to_configured_day() {
    let config = RecurringConfig::monthly(1, Some(20));
    let next = calculate_next_due_date(&config, at(2024, 1, 5)).unwrap();
    assert_eq!(next, at(2024, 2, 20));
}

#[test]
fn test_monthly_builder_sets_only_day_of_month() {
    let config = RecurringConfig::monthly(2, Some(10));
    assert_eq!(config.kind, RecurrenceKind::Monthly);
    assert_eq!(config.interval, 2);
    assert_eq!(config.day_of_month, Some(10));
    assert!(config.days_of_week.is_none());
    assert!(config.end_date.is_none());
    assert!(config.next_due_date.is_none());
}

#[test]
fn test_stored_zero_day_of_month_counts_as_unset() {
    let config: RecurringConfig =
        serde_json::from_str(r#"{"type":"monthly","interval":1,"dayOfMonth":0}"#).unwrap();
    assert_eq!(
        calculate_next_due_date(&config, at(2024, 1, 15)).unwrap(),
        at(2024, 2, 15)
    );
    assert_eq!(recurring_description(&config), "Repeats every month");

    let next = next_instance_on_completion(&recurring_todo(config, at(2024, 1, 15)))
        .unwrap()
        .unwrap();
    assert_eq!(next.due_date, at(2024, 2, 15));
}

#[test]
fn test_monthly_without_day_keeps_day_or_clamps() {
    let config = RecurringConfig::monthly(1, None);
    assert_eq!(
        calculate_next_due_date(&config, at(2024, 1, 10)).unwrap(),
        at(2024, 2, 10)
    );
    assert_eq!(
        calculate_next_due_date(&config, at(2024, 3, 31)).unwrap(),
        at(2024, 4, 30)
    );
}

#[test]
fn test_yearly() {
    assert_eq!(
        calculate_next_due_date(&RecurringConfig::yearly(2), at(2023, 6, 10)).unwrap(),
        at(2025, 6, 10)
    );
    assert_eq!(
        calculate_next_due_date(&RecurringConfig::yearly(1), at(2024, 2, 29)).unwrap(),
        at(2025, 2, 28)
    );
}

#[test]
fn test_unknown_type_is_an_error() {
    assert_eq!(
        "hourly".parse::<RecurrenceKind>(),
        Err(TaskError::UnknownRecurrenceType("hourly".into()))
    );

    let raw = input(r#"{"type":"hourly","interval":1}"#);
    assert_eq!(
        RecurringConfig::try_from(raw),
        Err(TaskError::UnknownRecurrenceType("hourly".into()))
    );
}

// --- should_create_next_instance ---

#[test]
fn test_end_date_gating() {
    let current = at(2024, 1, 15);
    let next = at(2024, 1, 22);
    let weekly = RecurringConfig::weekly(1, [Weekday::Mon]);

    assert!(should_create_next_instance(&weekly, current).unwrap());
    assert!(should_create_next_instance(&weekly.clone().until(next), current).unwrap());
    assert!(
        !should_create_next_instance(&weekly.until(next - Duration::seconds(1)), current).unwrap()
    );
}

// --- create_next_instance ---

#[test]
fn test_create_next_instance() {
    let config = RecurringConfig::daily(1);
    let original = recurring_todo(config.clone(), at(2024, 1, 15));
    let next = create_next_instance(&original).unwrap();

    assert_eq!(next.parent_todo_id.as_deref(), Some("todo-1"));
    assert_eq!(next.due_date, at(2024, 1, 16));
    assert_eq!(next.status, TodoStatus::New);
    assert!(!next.completed);
    assert!(next.is_recurring);
    assert_eq!(next.title, original.title);
    assert_eq!(next.description, original.description);
    assert_eq!(next.priority, Priority::Low);
    assert_eq!(next.tags, vec!["home"]);
    assert_eq!(next.user_id, "user-42");
    assert_eq!(next.recurring_config, config);

    // Original is untouched
    assert!(original.completed);
    assert_eq!(original.due_date, Some(at(2024, 1, 15)));

    let value = serde_json::to_value(&next).unwrap();
    assert!(value.get("_id").is_none());
    assert_eq!(value["parentTodoId"], "todo-1");
}

#[test]
fn test_create_next_instance_requires_recurrence() {
    let mut todo = recurring_todo(RecurringConfig::daily(1), at(2024, 1, 15));
    todo.is_recurring = false;
    assert!(matches!(
        create_next_instance(&todo),
        Err(TaskError::NotRecurring(_))
    ));

    let mut todo = recurring_todo(RecurringConfig::daily(1), at(2024, 1, 15));
    todo.recurring_config = None;
    assert!(matches!(
        create_next_instance(&todo),
        Err(TaskError::NotRecurring(_))
    ));

    let mut todo = recurring_todo(RecurringConfig::daily(1), at(2024, 1, 15));
    todo.due_date = None;
    assert!(matches!(
        create_next_instance(&todo),
        Err(TaskError::NotRecurring(_))
    ));
}

#[test]
fn test_next_instance_on_completion() {
    let todo = recurring_todo(RecurringConfig::daily(1), at(2024, 1, 15));
    let next = next_instance_on_completion(&todo).unwrap().unwrap();
    assert_eq!(next.due_date, at(2024, 1, 16));

    let ended = recurring_todo(
        RecurringConfig::daily(1).until(at(2024, 1, 15)),
        at(2024, 1, 15),
    );
    assert!(next_instance_on_completion(&ended).unwrap().is_none());

    let mut one_off = todo;
    one_off.is_recurring = false;
    assert!(next_instance_on_completion(&one_off).unwrap().is_none());
}

// --- validation ---

#[test]
fn test_valid_config() {
    let now = at(2024, 1, 15);
    let report = input(
        r#"{"type":"weekly","interval":2,"daysOfWeek":[1,3],"endDate":"2024-06-01T00:00:00Z"}"#,
    )
    .validate_at(now);

    assert!(report.is_valid);
    assert!(report.errors.is_empty());
}

#[test]
fn test_validation_collects_every_violation() {
    let now = at(2024, 1, 15);
    let report = input(r#"{"type":"fortnightly","interval":0,"endDate":"2020-01-01"}"#).validate_at(now);

    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec![
            "Invalid recurring type",
            "Interval must be between 1 and 365",
            "End date cannot be in the past",
        ]
    );
}

#[test]
fn test_validation_weekly_days() {
    let now = at(2024, 1, 15);

    let empty = input(r#"{"type":"weekly","interval":1,"daysOfWeek":[]}"#).validate_at(now);
    assert_eq!(
        empty.errors,
        vec!["At least one day must be selected for weekly recurrence"]
    );

    let out_of_range =
        input(r#"{"type":"weekly","interval":400,"daysOfWeek":[7,1]}"#).validate_at(now);
    assert_eq!(
        out_of_range.errors,
        vec![
            "Interval must be between 1 and 365",
            "Invalid day of week values"
        ]
    );
}

#[test]
fn test_validation_day_of_month_and_end_date() {
    let now = at(2024, 1, 15);

    let report = input(r#"{"type":"monthly","interval":1,"dayOfMonth":32}"#).validate_at(now);
    assert_eq!(report.errors, vec!["Day of month must be between 1 and 31"]);

    let report =
        input(r#"{"type":"daily","interval":1,"endDate":"not a date"}"#).validate_at(now);
    assert_eq!(report.errors, vec!["Invalid end date"]);
}

#[test]
fn test_typed_config_validation() {
    let now = at(2024, 1, 15);
    assert!(RecurringConfig::daily(1).validate_at(now).is_valid);
    assert!(!RecurringConfig::daily(0).validate_at(now).is_valid);
    assert!(
        !RecurringConfig::daily(1)
            .until(at(2023, 1, 1))
            .validate_at(now)
            .is_valid
    );
}

#[test]
fn test_input_conversion() {
    let config = RecurringConfig::try_from(input(
        r#"{"type":"weekly","interval":1,"daysOfWeek":[1,3,5],"endDate":"2025-01-01"}"#,
    ))
    .unwrap();

    assert_eq!(config.kind, RecurrenceKind::Weekly);
    assert_eq!(
        config.days_of_week,
        Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri])
    );
    assert_eq!(
        config.end_date,
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    );

    let invalid = RecurringConfig::try_from(input(r#"{"type":"monthly","interval":0,"dayOfMonth":40}"#));
    assert_eq!(
        invalid,
        Err(TaskError::InvalidConfig(vec![
            "Interval must be between 1 and 365".into(),
            "Day of month must be between 1 and 31".into(),
        ]))
    );
}

// --- description ---

#[test]
fn test_recurring_description() {
    let weekly = RecurringConfig::weekly(2, [Weekday::Mon, Weekday::Wed])
        .until(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(
        recurring_description(&weekly),
        "Repeats every 2 weeks on Mon, Wed until 1/1/2025"
    );
    assert_eq!(weekly.to_string(), recurring_description(&weekly));

    assert_eq!(
        recurring_description(&RecurringConfig::daily(1)),
        "Repeats every day"
    );
    assert_eq!(
        recurring_description(&RecurringConfig::monthly(1, Some(15))),
        "Repeats every month on day 15"
    );
    assert_eq!(
        recurring_description(&RecurringConfig::yearly(3)),
        "Repeats every 3 years"
    );
}

// --- serde ---

#[test]
fn test_config_json_uses_day_numbers() {
    let config: RecurringConfig =
        serde_json::from_str(r#"{"type":"weekly","interval":1,"daysOfWeek":[0,6]}"#).unwrap();
    assert_eq!(config.days_of_week, Some(vec![Weekday::Sun, Weekday::Sat]));

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["type"], "weekly");
    assert_eq!(value["daysOfWeek"], serde_json::json!([0, 6]));

    let bad = serde_json::from_str::<RecurringConfig>(r#"{"type":"weekly","interval":1,"daysOfWeek":[9]}"#);
    assert!(bad.is_err());
}
