use once_cell::sync::Lazy;
use regex::Regex;

/// Text cleaning utilities for extracted TEI content
///
/// Extracted text arrives with the source document's line wrapping and
/// indentation baked in. Everything downstream (the mapper's exact-text
/// lookup in particular) keys on the cleaned form, so this must be the one
/// canonical normalization used everywhere.
// @const: Runs of CR/LF characters
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());

// @const: Runs of any whitespace
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize whitespace in extracted text to a canonical single-space form.
///
/// Line-break runs become a single space, then every remaining whitespace run
/// collapses to one space, then leading/trailing whitespace is trimmed.
/// Idempotent: `clean(clean(s)) == clean(s)`. Non-whitespace content and its
/// ordering are never changed.
pub fn clean(text: &str) -> String {
    let without_breaks = LINE_BREAKS.replace_all(text, " ");
    let collapsed = WHITESPACE_RUNS.replace_all(&without_breaks, " ");
    collapsed.trim().to_string()
}
