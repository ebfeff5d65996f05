//! Recovery of JSON objects from model output.
//!
//! Models wrap JSON in markdown fences or surround it with prose even when
//! told not to. Extraction strips the fences, then keeps everything from the
//! first `{` to the last `}`. The span is greedy, not brace-balanced: prose
//! that itself contains braces, or output with several JSON objects, yields a
//! candidate that fails to parse.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const FENCES: &[&str] = &["```json\n", "```json", "```\n", "```"];

/// Returns the JSON candidate inside raw model output.
pub fn candidate(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();
    for fence in FENCES {
        cleaned = cleaned.replace(fence, "");
    }
    let cleaned = cleaned.trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => cleaned[start..=end].to_string(),
        _ => cleaned.to_string(),
    }
}

/// Extracts a JSON object from raw model output.
///
/// # Errors
///
/// Returns [`Error::Parse`] carrying the raw text if no JSON object can be
/// recovered.
pub fn extract_json(raw: &str) -> Result<Value> {
    let candidate = candidate(raw);
    debug!(
        "Extracted {} chars of JSON from {} chars of output",
        candidate.len(),
        raw.len()
    );

    let value: Value =
        serde_json::from_str(&candidate).map_err(|e| Error::parse(e.to_string(), raw))?;
    if !value.is_object() {
        return Err(Error::parse("expected a JSON object", raw));
    }
    Ok(value)
}

/// Extracts a JSON object from raw model output and decodes it.
///
/// # Errors
///
/// Returns [`Error::Parse`] if no JSON object can be recovered or it does
/// not match `T`.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|e| Error::parse(e.to_string(), raw))
}
