//! Email-to-task extraction
//!
//! Derives a title, description, priority, due date, tags and a confidence
//! score from an [`EmailTask`] using fixed keyword tables and an ordered list
//! of date patterns. Parsing is total: sparse or malformed input yields a
//! low-confidence result instead of an error.

use crate::keywords::{self, contains_any};
use crate::text::{char_len, clean_inline, truncate_with_ellipsis};
use crate::types::{EmailParseResult, EmailTask, Priority};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Longest suggested title, leaving headroom under the 200-character task limit
pub const MAX_TITLE_CHARS: usize = 190;

/// Longest suggested or converted description
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Most tags suggested for one email
pub const MAX_TAGS: usize = 5;

/// Title used when neither subject nor body yields anything
pub const FALLBACK_TITLE: &str = "Email Task";

/// Titles shorter than this fall back to the first body line
const MIN_TITLE_CHARS: usize = 3;

static REPLY_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:(?:re|fwd?)\s*:\s*)+").unwrap());

static HASHTAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w[\w-]*)").unwrap());

/// Parse an email, resolving relative deadlines against the current time
#[must_use]
pub fn parse_email(email: &EmailTask) -> EmailParseResult {
    parse_email_at(email, Utc::now())
}

/// Parse an email, resolving "end of week", "next week" and weekday names against `now`
#[must_use]
pub fn parse_email_at(email: &EmailTask, now: DateTime<Utc>) -> EmailParseResult {
    let text = email.combined_text();

    let result = EmailParseResult {
        suggested_title: extract_title(email),
        suggested_description: extract_description(email),
        suggested_priority: classify_priority(&text),
        suggested_due_date: extract_due_date(&text, email.received_at, now),
        suggested_tags: extract_tags(email, &text),
        confidence: score_confidence(email, &text),
    };

    debug!(
        "Parsed email {}: {:?} priority={} confidence={}",
        email.id, result.suggested_title, result.suggested_priority, result.confidence
    );

    result
}

fn extract_title(email: &EmailTask) -> String {
    let subject = REPLY_PREFIX_REGEX.replace(&email.subject, "");
    let title = truncate_with_ellipsis(&clean_inline(&subject), MAX_TITLE_CHARS);
    if char_len(&title) >= MIN_TITLE_CHARS {
        return title;
    }

    let first_line = email.content.lines().next().unwrap_or_default();
    let title = truncate_with_ellipsis(&clean_inline(first_line), MAX_TITLE_CHARS);
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

fn extract_description(email: &EmailTask) -> String {
    let description = format!(
        "From: {}\nReceived: {}\n\n{}",
        email.sender,
        format_timestamp(email.received_at),
        trim_signature(&email.content)
    );
    truncate_with_ellipsis(description.trim_end(), MAX_DESCRIPTION_CHARS)
}

/// `1/15/2024, 10:00:00 AM`
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Cut the body at the last line containing a sign-off phrase
fn trim_signature(content: &str) -> &str {
    let mut offset = 0;
    let mut cut = None;
    for line in content.split_inclusive('\n') {
        if contains_any(&line.to_lowercase(), keywords::SIGNATURE) {
            cut = Some(offset);
        }
        offset += line.len();
    }
    cut.map_or(content, |end| &content[..end]).trim()
}

/// Keyword tiers checked in order; the first tier with a hit decides
const PRIORITY_RULES: &[(&[&str], Priority)] = &[
    (keywords::HIGH_PRIORITY, Priority::High),
    (keywords::MEDIUM_PRIORITY, Priority::Medium),
    (keywords::ACTION, Priority::Medium),
];

fn classify_priority(text: &str) -> Priority {
    PRIORITY_RULES
        .iter()
        .find(|(list, _)| contains_any(text, list))
        .map_or(Priority::Low, |&(_, priority)| priority)
}

/// Instants a matched deadline phrase is resolved against
struct DateContext {
    received_at: DateTime<Utc>,
    now: DateTime<Utc>,
}

type Resolver = fn(&Captures<'_>, &DateContext) -> Option<DateTime<Utc>>;

struct DueDateRule {
    pattern: Regex,
    resolve: Resolver,
}

impl DueDateRule {
    fn new(pattern: &str, resolve: Resolver) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            resolve,
        }
    }
}

/// Deadline patterns in precedence order. A rule whose match cannot be
/// resolved (an impossible or past literal date) hands over to the next rule.
static DUE_DATE_RULES: LazyLock<Vec<DueDateRule>> = LazyLock::new(|| {
    vec![
        DueDateRule::new(r"by\s+(tomorrow|today)", |caps, ctx| {
            relative_day(&caps[1], ctx)
        }),
        DueDateRule::new(r"by\s+(end\s+of\s+week|eod|end\s+of\s+day)", |caps, ctx| {
            if caps[1].starts_with("end") && caps[1].ends_with("day") {
                end_of_day(ctx.received_at.date_naive())
            } else {
                next_weekday(ctx.now, 5)
            }
        }),
        DueDateRule::new(
            r"by\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday|next\s+week)",
            |caps, ctx| match weekday_index(&caps[1]) {
                Some(day) => next_weekday(ctx.now, day),
                None => end_of_day(ctx.now.date_naive().checked_add_days(Days::new(7))?),
            },
        ),
        DueDateRule::new(r"\b(\d{4})-(\d{2})-(\d{2})\b", |caps, ctx| {
            let date = NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )?;
            literal_date(date, ctx)
        }),
        DueDateRule::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b", |caps, ctx| {
            let date = NaiveDate::from_ymd_opt(
                caps[3].parse().ok()?,
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
            )?;
            literal_date(date, ctx)
        }),
        DueDateRule::new(r"(deadline|due)\s+(tomorrow|today)", |caps, ctx| {
            relative_day(&caps[2], ctx)
        }),
    ]
});

fn extract_due_date(
    text: &str,
    received_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let ctx = DateContext { received_at, now };
    DUE_DATE_RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(text)?;
        (rule.resolve)(&caps, &ctx)
    })
}

/// `today` or `tomorrow`, relative to the day the email was received
fn relative_day(word: &str, ctx: &DateContext) -> Option<DateTime<Utc>> {
    let received = ctx.received_at.date_naive();
    match word {
        "today" => end_of_day(received),
        _ => end_of_day(received.checked_add_days(Days::new(1))?),
    }
}

/// A date written out in the email; only dates after receipt count
fn literal_date(date: NaiveDate, ctx: &DateContext) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    if midnight > ctx.received_at {
        end_of_day(date)
    } else {
        warn!(
            "Ignoring deadline {date}: not after receipt at {}",
            ctx.received_at
        );
        None
    }
}

/// Next occurrence of `weekday` (0 = Sunday) on or after `from`, end of day
fn next_weekday(from: DateTime<Utc>, weekday: u32) -> Option<DateTime<Utc>> {
    let today = from.weekday().num_days_from_sunday();
    let ahead = (weekday + 7 - today) % 7;
    end_of_day(from.date_naive().checked_add_days(Days::new(u64::from(ahead)))?)
}

fn weekday_index(name: &str) -> Option<u32> {
    match name {
        "sunday" => Some(0),
        "monday" => Some(1),
        "tuesday" => Some(2),
        "wednesday" => Some(3),
        "thursday" => Some(4),
        "friday" => Some(5),
        "saturday" => Some(6),
        _ => None,
    }
}

/// 23:59:59.999 UTC on `date`
fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_milli_opt(23, 59, 59, 999)?.and_utc())
}

fn extract_tags(email: &EmailTask, text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    if let Some(domain) = email.sender_domain() {
        push_unique(&mut tags, domain.to_lowercase());
    }

    for caps in HASHTAG_REGEX.captures_iter(text) {
        let tag = caps[1].trim_end_matches('-');
        push_unique(&mut tags, tag.to_string());
    }

    for keyword in keywords::CATEGORY {
        if text.contains(keyword) {
            push_unique(&mut tags, (*keyword).to_string());
        }
    }

    tags.truncate(MAX_TAGS);
    tags
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// Confidence in tenths so the additive terms stay exact
fn score_confidence(email: &EmailTask, text: &str) -> f64 {
    let mut tenths: i32 = 5;

    if contains_any(&email.subject.to_lowercase(), keywords::ACTION) {
        tenths += 2;
    }
    if contains_any(text, keywords::HIGH_PRIORITY) || contains_any(text, keywords::MEDIUM_PRIORITY)
    {
        tenths += 1;
    }
    if contains_any(text, keywords::DATE) {
        tenths += 1;
    }

    let length = char_len(&email.content);
    if length < 50 {
        tenths -= 2;
    }
    if length > 2000 {
        tenths -= 1;
    }

    f64::from(tenths.clamp(0, 10)) / 10.0
}
