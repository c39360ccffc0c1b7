// Filename title parser
// Pure: filename stem in, best-guess lesson title out. Ordinal noise like
// "Lesson 5 - " or "05 - " is stripped; anything unrecognized passes through.

use std::sync::OnceLock;

use regex::Regex;

/// Separators recognized between an ordinal and the title:
/// hyphen, en-dash, underscore, colon, period.
const SEPARATORS: &[char] = &['-', '\u{2013}', '_', ':', '.', ' '];

fn word_ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:lesson|lecture|episode|part|chapter|unit|module|session|video)\s+\d+\s*[-\u{2013}_:.]?\s*(.+)$",
        )
        .expect("word ordinal regex is valid")
    })
}

fn numeric_ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d+\s*[-\u{2013}_:.]\s*(.+)$").expect("numeric ordinal regex is valid")
    })
}

/// Extract a lesson title from a filename stem (extension already stripped).
///
/// Rules apply in order, first match wins:
/// 1. "Lesson 5 - Title" style word ordinals
/// 2. "05 - Title" style numeric ordinals
/// 3. The stem itself, trimmed of surrounding whitespace and separators
///
/// Never returns a padded result; a stem that is nothing but an ordinal
/// (e.g. "0123") passes through unchanged.
pub fn parse_lesson_title(stem: &str) -> String {
    if let Some(caps) = word_ordinal_re().captures(stem) {
        return caps[1].trim().to_string();
    }

    if let Some(caps) = numeric_ordinal_re().captures(stem) {
        return caps[1].trim().to_string();
    }

    stem.trim().trim_matches(|c| SEPARATORS.contains(&c)).to_string()
}
