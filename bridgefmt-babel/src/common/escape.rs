//! Text escaping shared by the walker and the flattener.
//!
//! mrkdwn has no backslash escapes. A reserved character is neutralized by
//! fencing it with U+FFF1, an unassigned code point that breaks the delimiter
//! match in Slack clients and renders as nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

pub const ESCAPE_FENCE: char = '\u{FFF1}';

const RESERVED: [char; 4] = ['*', '_', '~', '`'];

/// Start of a URL inside a whitespace-delimited token.
pub static URL_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bhttps?://").expect("URL pattern is valid"));

pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Fences every reserved mrkdwn character in `text`.
pub fn escape_reserved(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_reserved) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if is_reserved(c) {
            out.push(ESCAPE_FENCE);
            out.push(c);
            out.push(ESCAPE_FENCE);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Decodes HTML entities (`&amp;`, `&#39;`, ...).
pub fn unescape_entities(text: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(text)
}

/// Escapes text for an HTML text node.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Escapes text for a double-quoted HTML attribute.
pub fn escape_attr(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// A piece of text split at whitespace boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Word(&'a str),
    Space(&'a str),
}

/// Splits `text` into alternating words and whitespace runs, keeping both so
/// the caller can reassemble the input exactly.
pub fn split_words(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev == space => {}
            Some(prev) => {
                pieces.push(piece(&text[start..idx], prev));
                start = idx;
                in_space = Some(space);
            }
            None => in_space = Some(space),
        }
    }
    if let Some(prev) = in_space {
        pieces.push(piece(&text[start..], prev));
    }
    pieces
}

fn piece(text: &str, space: bool) -> Piece<'_> {
    if space {
        Piece::Space(text)
    } else {
        Piece::Word(text)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offsets of standalone occurrences of `keyword` in `word`: not glued
/// to a preceding or following word character.
pub fn keyword_positions(word: &str, keyword: &str) -> Vec<usize> {
    if keyword.is_empty() {
        return Vec::new();
    }
    word.match_indices(keyword)
        .filter(|(idx, _)| {
            let before = word[..*idx].chars().next_back();
            let after = word[idx + keyword.len()..].chars().next();
            !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
        })
        .map(|(idx, _)| idx)
        .collect()
}
