//! Recovering JSON from free-form model output.
//!
//! Models wrap JSON in code fences or chatter around it despite being told
//! not to. The extractor takes the widest bracketed array in the text; when
//! there is none it falls back to a trailing object.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{PostPilotError, Result};

/// First `[` to last `]`, across lines.
static ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// First `{` to a `}` that ends the text.
static TRAILING_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}\s*$").unwrap());

/// Opening fence with optional language tag, or a closing fence.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").unwrap());

/// Extracts and parses the JSON array (or trailing object) embedded in `text`.
///
/// Fails with [`PostPilotError::MalformedModelOutput`] when no bracketed
/// structure is present or the candidate does not parse.
pub fn extract_json_from_text(text: &str) -> Result<Value> {
    let unfenced = FENCE_RE.replace_all(text.trim(), "");
    let unfenced = unfenced.trim();

    let candidate = ARRAY_RE
        .find(unfenced)
        .or_else(|| TRAILING_OBJECT_RE.find(unfenced))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            PostPilotError::malformed("No JSON array or object found in model output.")
        })?;

    serde_json::from_str(candidate)
        .map_err(|err| PostPilotError::malformed(format!("model output is not valid JSON: {err}")))
}
