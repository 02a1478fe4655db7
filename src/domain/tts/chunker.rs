//! Splits long text into provider-sized chunks.
//!
//! Paragraphs are kept whole whenever they fit. A paragraph that is too long is
//! broken at sentence endings, a sentence that is too long at whitespace, and a
//! single word that is too long at character boundaries. Every chunk returned is
//! at most `max_chars` characters long.

use once_cell::sync::Lazy;
use regex::Regex;

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").expect("paragraph pattern is valid"));

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("sentence pattern is valid"));

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";
const WORD_SEPARATOR: &str = " ";

/// A unit the packer can place into a chunk, with the separator that goes in
/// front of it when it follows other text in the same chunk.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    text: &'a str,
    separator: &'static str,
}

/// Number of characters (Unicode scalar values) in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into ordered chunks of at most `max_chars` characters.
///
/// Text that already fits is returned unchanged as a single chunk. Blank or
/// whitespace-only text yields no chunks.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);

    if text.trim().is_empty() {
        return Vec::new();
    }

    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    for paragraph in PARAGRAPH_BREAK.split(text).map(str::trim) {
        if paragraph.is_empty() {
            continue;
        }
        split_paragraph(paragraph, max_chars, &mut pieces);
    }

    pack(&pieces, max_chars)
}

fn split_paragraph<'a>(paragraph: &'a str, max_chars: usize, pieces: &mut Vec<Piece<'a>>) {
    if char_len(paragraph) <= max_chars {
        pieces.push(Piece {
            text: paragraph,
            separator: PARAGRAPH_SEPARATOR,
        });
        return;
    }

    for (index, sentence) in sentences(paragraph).into_iter().enumerate() {
        let separator = if index == 0 {
            PARAGRAPH_SEPARATOR
        } else {
            SENTENCE_SEPARATOR
        };
        split_sentence(sentence, separator, max_chars, pieces);
    }
}

fn split_sentence<'a>(
    sentence: &'a str,
    separator: &'static str,
    max_chars: usize,
    pieces: &mut Vec<Piece<'a>>,
) {
    if char_len(sentence) <= max_chars {
        pieces.push(Piece {
            text: sentence,
            separator,
        });
        return;
    }

    tracing::debug!(
        sentence_length = char_len(sentence),
        max_chars = max_chars,
        "Sentence exceeds chunk limit, splitting at word boundaries"
    );

    for (index, word) in sentence.split_whitespace().enumerate() {
        let separator = if index == 0 { separator } else { WORD_SEPARATOR };

        if char_len(word) <= max_chars {
            pieces.push(Piece {
                text: word,
                separator,
            });
            continue;
        }

        // Single word longer than the limit: cut at character boundaries.
        for (slice_index, slice) in char_slices(word, max_chars).into_iter().enumerate() {
            pieces.push(Piece {
                text: slice,
                separator: if slice_index == 0 { separator } else { "" },
            });
        }
    }
}

/// Sentences of a paragraph, each keeping its terminal punctuation.
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(paragraph) {
        let sentence = paragraph[last_end..mat.end()].trim();
        if !sentence.is_empty() {
            result.push(sentence);
        }
        last_end = mat.end();
    }

    let remaining = paragraph[last_end..].trim();
    if !remaining.is_empty() {
        result.push(remaining);
    }

    result
}

fn char_slices(word: &str, max_chars: usize) -> Vec<&str> {
    let mut slices = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in word.char_indices() {
        if count == max_chars {
            slices.push(&word[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < word.len() {
        slices.push(&word[start..]);
    }

    slices
}

/// Greedily pack pieces into chunks no longer than `max_chars`.
fn pack(pieces: &[Piece<'_>], max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(piece.text);

        if current.is_empty() {
            current.push_str(piece.text);
            current_len = piece_len;
            continue;
        }

        let separator_len = char_len(piece.separator);
        if current_len + separator_len + piece_len <= max_chars {
            current.push_str(piece.separator);
            current.push_str(piece.text);
            current_len += separator_len + piece_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(piece.text);
            current_len = piece_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
