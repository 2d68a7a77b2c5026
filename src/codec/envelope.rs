//! The `Search.setIndex(...)` registration call wrapped around the index literal.

use crate::error::LoadError;
use regex::Regex;
use std::sync::LazyLock;

const PREFIX: &str = "Search.setIndex(";
const SUFFIX: &str = ")";

static ENVELOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\s*Search\.setIndex\s*\((.*)\)\s*;?\s*\z").expect("envelope pattern is valid")
});

/// Returns the object literal inside the registration call.
///
/// A bare object literal (no call) is accepted as is.
pub(crate) fn strip(text: &str) -> Result<&str, LoadError> {
    let text = text.trim_start_matches('\u{feff}');
    if let Some(captures) = ENVELOPE.captures(text)
        && let Some(body) = captures.get(1)
    {
        return Ok(body.as_str());
    }

    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let preview: String = trimmed.chars().take(40).collect();
    Err(LoadError::Envelope(if preview.is_empty() {
        "file is empty".to_string()
    } else {
        format!("expected `Search.setIndex(...)`, found `{}`", preview)
    }))
}

/// Wraps a serialized object literal in the registration call.
pub(crate) fn wrap(body: &str) -> String {
    let mut out = String::with_capacity(PREFIX.len() + body.len() + SUFFIX.len());
    out.push_str(PREFIX);
    out.push_str(body);
    out.push_str(SUFFIX);
    out
}
