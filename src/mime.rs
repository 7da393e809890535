//! Building an [`EmailTask`] from a raw RFC 5322 message

use crate::error::{Result, TaskError};
use crate::text::strip_html;
use crate::types::{EmailAttachment, EmailTask};
use chrono::{DateTime, Utc};
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};
use tracing::debug;

impl EmailTask {
    /// Parse raw message bytes into an email ready for task extraction.
    ///
    /// The sender is reduced to its bare address, a missing or unreadable
    /// `Date` header falls back to now, and HTML-only bodies are converted to
    /// plain text.
    pub fn from_rfc822(id: impl Into<String>, raw: &[u8]) -> Result<Self> {
        let parsed = mailparse::parse_mail(raw).map_err(|e| TaskError::Structure(e.to_string()))?;

        let subject = parsed.headers.get_first_value("Subject").unwrap_or_default();
        let sender = parsed
            .headers
            .get_first_value("From")
            .map(|from| extract_address(&from))
            .unwrap_or_default();
        let received_at = parsed
            .headers
            .get_first_value("Date")
            .and_then(|date| DateTime::parse_from_rfc2822(date.trim()).ok())
            .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

        let mut text = String::new();
        let mut html = None;
        let mut attachments = Vec::new();
        collect_parts(&parsed, &mut text, &mut html, &mut attachments);

        let content = if text.trim().is_empty() {
            html.as_deref().map(strip_html).unwrap_or_default()
        } else {
            text.trim().to_string()
        };

        let email = Self {
            id: id.into(),
            subject,
            sender,
            content,
            received_at,
            attachments,
        };
        debug!(
            "Read email {} from {} with {} attachment(s)",
            email.id,
            email.sender,
            email.attachments.len()
        );
        Ok(email)
    }
}

/// `Name <user@domain>` to `user@domain`; anything else is kept trimmed
fn extract_address(from: &str) -> String {
    let from = from.trim();
    match (from.find('<'), from.rfind('>')) {
        (Some(start), Some(end)) if start < end => from[start + 1..end].trim().to_string(),
        _ => from.trim_matches('"').to_string(),
    }
}

fn collect_parts(
    part: &ParsedMail<'_>,
    text: &mut String,
    html: &mut Option<String>,
    attachments: &mut Vec<EmailAttachment>,
) {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_parts(sub, text, html, attachments);
        }
        return;
    }

    let disposition = part.get_content_disposition();
    let filename = disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .cloned();
    let mimetype = part.ctype.mimetype.to_lowercase();

    if disposition.disposition == DispositionType::Attachment || filename.is_some() {
        let size = part.get_body_raw().map_or(0, |body| body.len() as u64);
        attachments.push(EmailAttachment {
            name: filename.unwrap_or_else(|| "attachment".to_string()),
            mime_type: mimetype,
            size,
            url: None,
        });
        return;
    }

    let Ok(body) = part.get_body() else {
        return;
    };
    if mimetype.contains("text/html") {
        if html.is_none() {
            *html = Some(body);
        }
    } else if mimetype.contains("text/plain") && text.is_empty() {
        *text = body;
    }
}
