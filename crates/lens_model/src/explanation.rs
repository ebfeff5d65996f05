//! Structured span explanations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the number of key details in an explanation.
pub const MAX_KEY_DETAILS: usize = 5;

/// Coarse latency bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    /// Well under the expected latency for the span type.
    Fast,
    /// Within the expected latency.
    Normal,
    /// Noticeably slow.
    Slow,
    /// Beyond the slow threshold.
    Critical,
}

impl Assessment {
    /// Returns the lowercase name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Slow => "slow",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performance section of an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    /// Human-readable duration, e.g. `45.00ms`.
    pub duration: String,
    /// Latency bucket.
    pub assessment: Assessment,
}

/// Error details for a failed span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Always true when present in an engine-produced explanation.
    pub has_error: bool,
    /// `HTTP <code>` or `Error`.
    #[serde(default)]
    pub error_type: Option<String>,
    /// Message taken from the span logs.
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A structured, technical explanation of one span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResult {
    /// One-sentence summary.
    pub summary: String,
    /// Detected span category, e.g. `HTTP Client`.
    pub span_type: String,
    /// Duration and latency bucket.
    pub performance: Performance,
    /// Present only when the span failed.
    #[serde(default)]
    pub error_info: Option<ErrorInfo>,
    /// Notable tags, at most [`MAX_KEY_DETAILS`].
    #[serde(default)]
    pub key_details: Vec<String>,
}

impl ExplanationResult {
    /// The explanation returned when span data cannot be read at all.
    ///
    /// The `normal` assessment is a fixed placeholder, not derived from the
    /// latency thresholds.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            summary: "Unable to analyze span data".to_string(),
            span_type: "Unknown".to_string(),
            performance: Performance {
                duration: "0ms".to_string(),
                assessment: Assessment::Normal,
            },
            error_info: None,
            key_details: Vec::new(),
        }
    }

    /// Returns true if the explanation reports an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error_info.as_ref().is_some_and(|info| info.has_error)
    }

    /// Checks that the required text fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for an empty summary, span type or
    /// duration.
    pub fn validate(&self) -> Result<()> {
        if self.summary.trim().is_empty() {
            return Err(Error::MissingField("summary"));
        }
        if self.span_type.trim().is_empty() {
            return Err(Error::MissingField("spanType"));
        }
        if self.performance.duration.trim().is_empty() {
            return Err(Error::MissingField("performance.duration"));
        }
        Ok(())
    }

    /// Drops key details beyond [`MAX_KEY_DETAILS`].
    pub fn truncate_key_details(&mut self) {
        self.key_details.truncate(MAX_KEY_DETAILS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_null_error_info() {
        let value = serde_json::to_value(ExplanationResult::fallback()).unwrap();
        assert_eq!(
            value,
            json!({
                "summary": "Unable to analyze span data",
                "spanType": "Unknown",
                "performance": {"duration": "0ms", "assessment": "normal"},
                "errorInfo": null,
                "keyDetails": []
            })
        );
    }

    #[test]
    fn decodes_model_output_without_optional_fields() {
        let result: ExplanationResult = serde_json::from_value(json!({
            "summary": "HTTP Client: GET /users from web, completed successfully",
            "spanType": "HTTP Client",
            "performance": {"duration": "12.00ms", "assessment": "fast"}
        }))
        .unwrap();

        assert!(result.error_info.is_none());
        assert!(result.key_details.is_empty());
        assert_eq!(result.performance.assessment, Assessment::Fast);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_assessment() {
        let result: std::result::Result<ExplanationResult, _> = serde_json::from_value(json!({
            "summary": "s",
            "spanType": "t",
            "performance": {"duration": "1ms", "assessment": "sluggish"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_summary_is_invalid() {
        let mut result = ExplanationResult::fallback();
        result.summary = "  ".to_string();
        assert_eq!(result.validate(), Err(Error::MissingField("summary")));
    }

    #[test]
    fn key_details_are_capped() {
        let mut result = ExplanationResult::fallback();
        result.key_details = (0..8).map(|i| format!("detail {i}")).collect();
        result.truncate_key_details();
        assert_eq!(result.key_details.len(), MAX_KEY_DETAILS);
        assert_eq!(result.key_details[4], "detail 4");
    }

    #[test]
    fn has_error_reads_error_info() {
        let mut result = ExplanationResult::fallback();
        assert!(!result.has_error());
        result.error_info = Some(ErrorInfo {
            has_error: true,
            error_type: Some("HTTP 500".to_string()),
            error_message: None,
        });
        assert!(result.has_error());
    }
}
