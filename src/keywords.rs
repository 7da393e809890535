//! Keyword tables driving priority, confidence, tag and signature detection.
//!
//! All entries are lower-case and matched as plain substrings of lower-cased text.

pub const HIGH_PRIORITY: &[&str] = &[
    "urgent",
    "asap",
    "emergency",
    "critical",
    "important",
    "deadline",
    "rush",
    "priority",
    "immediate",
    "quickly",
    "soon",
];

pub const MEDIUM_PRIORITY: &[&str] = &[
    "needed",
    "required",
    "should",
    "would like",
    "please",
    "when possible",
];

/// Verbs suggesting the email asks for something to be done
pub const ACTION: &[&str] = &[
    "review",
    "complete",
    "finish",
    "submit",
    "send",
    "create",
    "update",
    "call",
    "email",
    "meet",
    "schedule",
    "prepare",
    "check",
    "verify",
    "approve",
    "process",
    "follow up",
    "followup",
];

pub const DATE: &[&str] = &[
    "by",
    "before",
    "until",
    "deadline",
    "due",
    "complete by",
    "finish by",
    "end of",
    "eod",
    "end of day",
    "tomorrow",
    "today",
    "next week",
    "this week",
];

/// Each keyword found becomes a tag of the same name
pub const CATEGORY: &[&str] = &[
    "meeting", "report", "review", "project", "task", "bug", "feature", "support", "client",
    "invoice", "payment", "contract", "proposal",
];

/// Sign-off phrases marking the start of a signature block
pub const SIGNATURE: &[&str] = &[
    "best regards",
    "sincerely",
    "thank you",
    "thanks",
    "sent from my",
    "regards",
    "cheers",
];

/// True if any keyword in `list` occurs in `text`
#[must_use]
pub fn contains_any(text: &str, list: &[&str]) -> bool {
    list.iter().any(|keyword| text.contains(keyword))
}
