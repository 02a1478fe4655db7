use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest completion budget requested from the model
const MAX_COMPLETION_TOKENS: u32 = 8192;
const CHANGE_LIST_TOKENS: u32 = 1024;

/// Answer shape requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// Full rewritten text inside a JSON object
    #[default]
    Json,
    /// `CHANGES_MADE:` list of replacements applied locally
    ChangeList,
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(PromptStyle::Json),
            "changes" | "change_list" | "changelist" => Ok(PromptStyle::ChangeList),
            other => Err(format!("unknown prompt style: {other}")),
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptStyle::Json => f.write_str("json"),
            PromptStyle::ChangeList => f.write_str("changes"),
        }
    }
}

pub fn build_prompt(style: PromptStyle, text: &str) -> String {
    match style {
        PromptStyle::Json => format!(
            r#"You are an editor preparing blog posts to be read aloud by a text-to-speech voice.

Replace profanity and crude language with natural, family-friendly alternatives while keeping the author's voice, tone and meaning.

Rules:
- Replace only profanity, e.g. "damn" → "darn", "shit" → "shoot"
- Keep every fact, argument and sentence that is not profane exactly as written
- The result must sound natural when spoken
- Do not add commentary, headings or notes to the text

Blog post:
<text>{text}</text>

Answer with a single JSON object and nothing else:
{{
  "cleaned_text": "the full cleaned text",
  "changed": true or false,
  "changes": ["\"original\" → \"replacement\"", ...],
  "summary": "one sentence describing the edits, or \"No changes needed\""
}}"#
        ),
        PromptStyle::ChangeList => format!(
            r#"Scan the text below for profanity or inappropriate language that should not be read aloud in a podcast.

Be extremely conservative: list ONLY actual profanity or swear words, each with a family-friendly replacement that sounds natural when spoken. Do not rewrite anything else.

<text>{text}</text>

Finish your answer with the list of replacements in exactly this format:
CHANGES_MADE:
- "original word" → "replacement"
- ...

If the text contains no profanity, finish with:
CHANGES_MADE: none"#
        ),
    }
}

/// Completion budget for cleaning `text`. The JSON style echoes the full text
/// back, so its budget grows with the input.
pub fn max_tokens_for(style: PromptStyle, text: &str) -> u32 {
    match style {
        PromptStyle::Json => {
            let words = text.split_whitespace().count() as u32;
            words
                .saturating_mul(2)
                .saturating_add(500)
                .min(MAX_COMPLETION_TOKENS)
        }
        PromptStyle::ChangeList => CHANGE_LIST_TOKENS,
    }
}
