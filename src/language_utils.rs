use anyhow::{Result, anyhow};
use isolang::Language;

use crate::errors::AlignerError;

/// Language utilities for ISO language code handling
///
/// The aligner backend supports a fixed set of 25 languages, identified by
/// ISO 639-1 (2-letter) codes. This module validates codes against that set
/// and resolves display names through isolang.
/// ISO 639-1 codes accepted by the aligner backend
pub const SUPPORTED_LANGUAGES: [&str; 25] = [
    "ca", "zh", "cs", "da", "nl", "en", "fi", "fr", "de", "el", "hu", "is", "it",
    "lt", "lv", "no", "pl", "pt", "ro", "ru", "sk", "sl", "es", "sv", "tr",
];

/// Fallback code used when a document's metadata language is the
/// "unknown" sentinel and the caller supplied none
pub const DEFAULT_LANGUAGE: &str = "en";

/// Check whether a code belongs to the supported set (case and
/// whitespace tolerant)
pub fn is_supported_language(code: &str) -> bool {
    let normalized = code.trim().to_lowercase();
    SUPPORTED_LANGUAGES.contains(&normalized.as_str())
}

/// Validate a code against the supported set, returning the normalized
/// (trimmed, lowercase) form
pub fn validate_supported_language(code: &str) -> Result<String, AlignerError> {
    let normalized = code.trim().to_lowercase();
    if SUPPORTED_LANGUAGES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(AlignerError::UnsupportedLanguage(code.trim().to_string()))
    }
}

/// Check if two language codes refer to the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    code1.trim().to_lowercase() == code2.trim().to_lowercase()
}

/// Get the English language name from an ISO 639-1 code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    let lang = Language::from_639_1(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
