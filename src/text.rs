//! Text cleanup helpers shared by the parser, the converter and MIME ingestion
//!
//! Every length here counts characters, not bytes, so truncation never
//! splits a multi-byte character.

use regex::Regex;
use std::sync::LazyLock;

/// Marker appended to anything cut short
pub const ELLIPSIS: &str = "...";

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#?[a-zA-Z0-9]+);").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Number of characters in `s`
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `max` characters of `s`
#[must_use]
pub fn take_chars(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(idx, _)| &s[..idx])
}

/// Cut `s` down to at most `max` characters, ending in `...` when shortened
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if char_len(s) <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    format!("{}{ELLIPSIS}", take_chars(s, keep).trim_end())
}

/// Keep the first `keep` characters of `s`, appending `...` if anything was cut
#[must_use]
pub fn clip(s: &str, keep: usize) -> String {
    if char_len(s) > keep {
        format!("{}{ELLIPSIS}", take_chars(s, keep))
    } else {
        s.to_string()
    }
}

/// Decode the handful of entities mail clients emit; unknown ones become a space
#[must_use]
pub fn decode_entities(s: &str) -> String {
    ENTITY_REGEX
        .replace_all(s, |caps: &regex::Captures<'_>| {
            match &caps[1] {
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                "#39" | "apos" => "'",
                _ => " ",
            }
            .to_string()
        })
        .into_owned()
}

/// Collapse runs of whitespace into single spaces and trim the ends
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_REGEX.replace_all(s, " ").trim().to_string()
}

/// Single-line cleanup used for titles: drop tags, decode entities, collapse whitespace
#[must_use]
pub fn clean_inline(s: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(s, "");
    collapse_whitespace(&decode_entities(&without_tags))
}

/// Render an HTML document as plain text, one block element per line
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    let mut in_script = false;
    let mut in_style = false;
    let mut tag = String::new();

    for c in html.chars() {
        if !in_tag && c == '<' {
            in_tag = true;
            tag.clear();
        } else if in_tag && c == '>' {
            in_tag = false;
            let name = tag.trim().to_lowercase();
            if name.starts_with("script") {
                in_script = true;
            } else if name.starts_with("/script") {
                in_script = false;
            } else if name.starts_with("style") {
                in_style = true;
            } else if name.starts_with("/style") {
                in_style = false;
            }
            if name.starts_with("br")
                || name.starts_with("/p")
                || name.starts_with("/div")
                || name.starts_with("/li")
                || name.starts_with("/h")
            {
                result.push('\n');
            }
        } else if in_tag {
            tag.push(c);
        } else if !in_script && !in_style {
            result.push(c);
        }
    }

    decode_entities(&result)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
