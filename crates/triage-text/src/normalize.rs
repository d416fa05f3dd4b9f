//! Text normalization shared by every downstream stage.
//!
//! `normalize` is a pure function: same input always yields the same
//! output, and applying it twice is a no-op. Callers must treat an empty
//! result as a validation failure, not silently proceed.

use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("email regex")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("phone regex"));
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?;:\-()]").expect("allow-list regex"));
static REPEAT_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?]){2,}").expect("punct regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("ws regex"));

/// Lower-case, strip URLs / e-mail addresses / phone-shaped digit runs,
/// space out characters outside a conservative alnum+punctuation
/// allow-list, collapse repeated terminal punctuation, and collapse
/// whitespace.
///
/// Returns an empty string for input that normalizes to nothing.
pub fn normalize(raw: &str) -> String {
    let text = raw.to_lowercase();
    // Strip addressable noise before the allow-list pass mangles the
    // separators the patterns anchor on.
    let text = URL_RE.replace_all(&text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = PHONE_RE.replace_all(&text, " ");
    // Replace with a space, never delete: deleting can weld the
    // neighbors into a new token (digit runs into phone shapes) that
    // only a second pass would strip.
    let text = DISALLOWED_RE.replace_all(&text, " ");
    let text = REPEAT_PUNCT_RE.replace_all(&text, "$1");
    let text = WS_RE.replace_all(&text, " ");
    text.trim().to_string()
}

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "this", "that", "these", "those", "i",
    "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

/// Stop-word-filtered unique keywords of at least `min_length`
/// characters, in order of first appearance.
pub fn extract_keywords(text: &str, min_length: usize) -> Vec<String> {
    let cleaned = normalize(text);
    let mut seen = std::collections::HashSet::new();
    let mut keywords = Vec::new();
    for word in cleaned.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if word.len() < min_length || STOP_WORDS.contains(&word) {
            continue;
        }
        if seen.insert(word.to_string()) {
            keywords.push(word.to_string());
        }
    }
    keywords
}
