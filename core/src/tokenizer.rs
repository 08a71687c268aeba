use lazy_static::lazy_static;
use regex::Regex;

/// Characters removed from a document before it is split into words.
pub const PUNCTUATION: [char; 3] = ['.', ',', '?'];

lazy_static! {
    static ref PUNCT_RE: Regex = {
        let set: String = PUNCTUATION.iter().collect();
        Regex::new(&format!("[{}]", regex::escape(&set))).expect("valid regex")
    };
}

/// Tokenize text into the sorted sequence of words used as index keys.
///
/// Punctuation is replaced by a space so that `"end.Next"` yields two words
/// rather than one run-together key. Splitting happens on every whitespace
/// character; the empty tokens that consecutive delimiters would produce are
/// dropped and never reach the index. Matching is case-sensitive.
pub fn tokenize(text: &str) -> Vec<String> {
    let stripped = PUNCT_RE.replace_all(text, " ");
    let mut tokens: Vec<String> = stripped
        .split(char::is_whitespace)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tokens.sort();
    tokens
}

/// Tokenize raw document bytes. Invalid UTF-8 is decoded lossily.
pub fn tokenize_bytes(bytes: &[u8]) -> Vec<String> {
    tokenize(&String::from_utf8_lossy(bytes))
}
