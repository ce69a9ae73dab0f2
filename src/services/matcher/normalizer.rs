//! Text normalization for cross-market name comparison.
//! Handles transliteration, separator variants, and marketing noise.

use deunicode::deunicode;
use regex::Regex;
use std::sync::LazyLock;

/// Compiled regex for converting separator characters to spaces.
static RE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_/]").expect("Invalid regex"));

/// Compiled regex for stripping non-alphanumeric characters.
static RE_NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("Invalid regex"));

/// Marketing suffixes that vary between listings of the same car.
const DECORATIVE_TOKENS: &[&str] = &["edition", "edicao", "limited", "limitada"];

/// Normalize a catalog entry name for comparison.
///
/// Pipeline:
/// 1. Transliterate accented characters to plain Latin via deunicode
/// 2. Lowercase
/// 3. Convert `-`, `_` and `/` separators to spaces
/// 4. Strip remaining non-alphanumeric symbols (keep spaces)
/// 5. Drop decorative marketing tokens
/// 6. Collapse and trim whitespace
///
/// Idempotent: normalizing an already normalized string is a no-op.
pub fn normalize(name: &str) -> String {
    let latin = deunicode(name);
    let lower = latin.to_lowercase();
    let spaced = RE_SEPARATORS.replace_all(&lower, " ");
    let clean = RE_NON_ALNUM.replace_all(&spaced, " ");

    let words: Vec<&str> = clean
        .split_whitespace()
        .filter(|w| !DECORATIVE_TOKENS.contains(w))
        .collect();
    words.join(" ")
}

/// Normalized form with the spaces removed as well.
///
/// Collapses spacing variants of the same name ("A Class", "AClass",
/// "A-Class") onto one string for substring comparison.
pub fn compact(name: &str) -> String {
    normalize(name).replace(' ', "")
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
