use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of cleaning one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanResult {
    pub cleaned_text: String,
    pub changed: bool,
    pub changes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Served from the on-disk cache without calling the model
    pub cached: bool,
    /// Set when the model answer could not be used and the input was returned as is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl CleanResult {
    /// Input passed through untouched, with the reason recorded.
    pub fn unchanged(text: &str, diagnostic: impl Into<String>) -> Self {
        Self {
            cleaned_text: text.to_string(),
            changed: false,
            changes: Vec::new(),
            summary: None,
            cached: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// A single word or phrase replacement reported by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub original: String,
    pub replacement: String,
}

impl fmt::Display for TextChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" → \"{}\"", self.original, self.replacement)
    }
}

impl TextChange {
    /// Replace every occurrence of `original` in `text`. Edges that are word
    /// characters must sit on a word boundary, so "ass" never touches "class".
    pub fn apply(&self, text: &str) -> String {
        if self.original.is_empty() {
            return text.to_string();
        }

        let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
        let mut pattern = regex::escape(&self.original);
        if is_word(self.original.chars().next()) {
            pattern = format!(r"\b{pattern}");
        }
        if is_word(self.original.chars().last()) {
            pattern = format!(r"{pattern}\b");
        }

        match Regex::new(&pattern) {
            Ok(re) => re
                .replace_all(text, regex::NoExpand(&self.replacement))
                .into_owned(),
            Err(_) => text.replace(&self.original, &self.replacement),
        }
    }
}

/// Apply replacements in order
pub fn apply_changes(text: &str, changes: &[TextChange]) -> String {
    changes
        .iter()
        .fold(text.to_string(), |acc, change| change.apply(&acc))
}
