//! Internal helpers for name normalization.
//!
//! These utilities are **not** part of the public API. They centralize the
//! normalization rules so uniqueness checks behave the same everywhere.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Normalize a display name: trim and collapse internal whitespace.
pub(crate) fn normalize_display_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    let mut out = String::new();
    for token in trimmed.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    Ok(out)
}

/// Normalize a name into its uniqueness key: decomposed, accent-stripped,
/// lowercased, non-alphanumerics collapsed to single spaces.
pub(crate) fn normalize_name_key(value: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in value.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim().to_string()
}
