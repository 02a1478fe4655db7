//! Decoding of free-form model answers.
//!
//! Two answer shapes are understood: a JSON object carrying the rewritten
//! text, and a `CHANGES_MADE:` block listing replacements. Anything else is
//! reported as [`ParsedResponse::Unparseable`]; parsing never fails hard.

use super::model::TextChange;
use super::prompt::PromptStyle;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

pub const CHANGES_SENTINEL: &str = "CHANGES_MADE:";

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?[ \t]*```").expect("fence pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// The model returned the full rewritten text
    Rewrite {
        cleaned_text: String,
        changed: Option<bool>,
        changes: Vec<String>,
        summary: Option<String>,
    },
    /// The model listed replacements to apply to the input
    ChangeList { changes: Vec<TextChange> },
    Unparseable { reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChangesField {
    Many(Vec<String>),
    One(String),
}

#[derive(Debug, Deserialize)]
struct RewritePayload {
    cleaned_text: String,
    #[serde(default, alias = "was_edited", alias = "changes_made")]
    changed: Option<bool>,
    #[serde(default)]
    changes: Option<ChangesField>,
    #[serde(default, alias = "changes_summary")]
    summary: Option<String>,
}

/// Content of the first fenced code block, or the trimmed input when there is none.
pub fn strip_code_fences(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

/// Decode an answer, trying the shape requested by `style` first.
pub fn parse_response(raw: &str, style: PromptStyle) -> ParsedResponse {
    let (first, second): (fn(&str) -> ParsedResponse, fn(&str) -> ParsedResponse) = match style {
        PromptStyle::Json => (parse_json, parse_change_list),
        PromptStyle::ChangeList => (parse_change_list, parse_json),
    };

    match first(raw) {
        ParsedResponse::Unparseable { reason } => match second(raw) {
            ParsedResponse::Unparseable { .. } => ParsedResponse::Unparseable { reason },
            parsed => parsed,
        },
        parsed => parsed,
    }
}

pub fn parse_json(raw: &str) -> ParsedResponse {
    let body = strip_code_fences(raw);

    let payload = serde_json::from_str::<RewritePayload>(body).or_else(|first_err| {
        // Prose around a bare object
        match (body.find('{'), body.rfind('}')) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str::<RewritePayload>(&body[start..=end])
            }
            _ => Err(first_err),
        }
    });

    match payload {
        Ok(payload) => {
            let changes = match payload.changes {
                Some(ChangesField::Many(items)) => items
                    .into_iter()
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect(),
                Some(ChangesField::One(item)) if !is_none_marker(&item) => {
                    vec![item.trim().to_string()]
                }
                _ => Vec::new(),
            };

            ParsedResponse::Rewrite {
                cleaned_text: payload.cleaned_text,
                changed: payload.changed,
                changes,
                summary: payload.summary.filter(|s| !s.trim().is_empty()),
            }
        }
        Err(e) => ParsedResponse::Unparseable {
            reason: format!("invalid JSON response: {e}"),
        },
    }
}

pub fn parse_change_list(raw: &str) -> ParsedResponse {
    let Some(position) = raw.rfind(CHANGES_SENTINEL) else {
        return ParsedResponse::Unparseable {
            reason: format!("response has no {CHANGES_SENTINEL} section"),
        };
    };

    let section = raw[position + CHANGES_SENTINEL.len()..].trim();
    let first_line = section.lines().next().unwrap_or_default();
    if is_none_marker(first_line) {
        return ParsedResponse::ChangeList {
            changes: Vec::new(),
        };
    }

    let changes: Vec<TextChange> = section.lines().filter_map(parse_change_line).collect();
    if changes.is_empty() {
        return ParsedResponse::Unparseable {
            reason: format!("{CHANGES_SENTINEL} section lists no replacements"),
        };
    }

    ParsedResponse::ChangeList { changes }
}

/// `- "original" → "replacement"`
fn parse_change_line(line: &str) -> Option<TextChange> {
    let line = line.trim().strip_prefix('-')?.trim();
    let (original, replacement) = line
        .split_once('→')
        .or_else(|| line.split_once("->"))?;

    let original = unquote(original);
    if original.is_empty() {
        return None;
    }

    Some(TextChange {
        original: original.to_string(),
        replacement: unquote(replacement).to_string(),
    })
}

fn unquote(value: &str) -> &str {
    value
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’' | '`'))
}

fn is_none_marker(value: &str) -> bool {
    let value = value.trim().trim_end_matches('.').to_lowercase();
    value.is_empty() || value == "none"
}
