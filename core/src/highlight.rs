//! Rendering of a document with the searched word marked.

use crate::config::HighlightStyle;
use regex::Regex;
use std::io::{self, Write};

/// How a document token is compared against the searched word.
#[derive(Debug, Clone)]
pub enum MatchMode {
    /// Token must equal the word exactly.
    Exact,
    /// Token matches when the regex finds a match anywhere in it.
    Pattern(Regex),
}

impl MatchMode {
    pub fn pattern(word: &str) -> Result<Self, regex::Error> {
        Ok(MatchMode::Pattern(Regex::new(word)?))
    }

    pub fn is_match(&self, word: &str, token: &str) -> bool {
        match self {
            MatchMode::Exact => token == word,
            MatchMode::Pattern(re) => re.is_match(token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub matched: bool,
}

/// Split `text` into alternating word and whitespace runs. Concatenating the
/// pieces gives back `text` unchanged.
pub fn split_preserving(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                pieces.push(&text[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Mark every word of `text` for which `is_match` holds. Whitespace is kept
/// as unmatched spans so nothing is dropped or reordered.
pub fn render<F>(text: &str, is_match: F) -> Vec<Span>
where
    F: Fn(&str) -> bool,
{
    split_preserving(text)
        .into_iter()
        .map(|piece| {
            let matched = !piece.starts_with(char::is_whitespace) && is_match(piece);
            Span { text: piece.to_string(), matched }
        })
        .collect()
}

/// Write spans to `out`, wrapping matched ones in the style's escape codes
/// when `color` is set.
pub fn write_spans<W: Write + ?Sized>(out: &mut W, spans: &[Span], style: HighlightStyle, color: bool) -> io::Result<()> {
    for span in spans {
        if span.matched && color {
            write!(out, "\x1b[{}m{}\x1b[0m", style.sgr(), span.text)?;
        } else {
            out.write_all(span.text.as_bytes())?;
        }
    }
    Ok(())
}
