//! Deterministic, rule-based completion provider.
//!
//! Stands in for a language model: it reads the request, runs the matching
//! rule engine from `lens_rules` and returns the result as JSON text, the same
//! shape a real model would produce.

use crate::error::{Error, Result};
use crate::prompt;
use crate::provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, CompletionTask, RequestKind,
    ResponseMetadata,
};
use async_trait::async_trait;
use lens_model::{ExplanationResult, SpanRecord};
use serde::Serialize;
use tracing::{debug, warn};

/// Model name reported by the mock provider.
pub const MOCK_MODEL: &str = "mock-llm-v1";
/// Provider name reported by the mock provider.
pub const MOCK_PROVIDER: &str = "mock";

const QUERY_TOKENS: u32 = 50;
const EXPLAIN_TOKENS: u32 = 100;

/// A provider backed by the rule engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider;

impl MockProvider {
    /// Creates a mock provider.
    pub const fn new() -> Self {
        Self
    }

    fn translate(query: &str) -> Result<String> {
        encode(&lens_rules::extract(query))
    }

    fn explain(span: &SpanRecord) -> Result<String> {
        encode(&lens_rules::analyze(span))
    }

    fn explain_prompt(text: &str) -> Result<String> {
        span_from_prompt(text).map_or_else(
            || {
                warn!("No readable span data in prompt, returning fallback explanation");
                encode(&ExplanationResult::fallback())
            },
            |span| Self::explain(&span),
        )
    }

    fn metadata(tokens_used: u32) -> ResponseMetadata {
        ResponseMetadata {
            model: MOCK_MODEL.to_string(),
            tokens_used,
            provider: MOCK_PROVIDER.to_string(),
        }
    }
}

/// Renders a rule engine result as completion text.
fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Provider(format!("encoding output: {e}")))
}

/// Recovers the span embedded after the span data marker.
fn span_from_prompt(text: &str) -> Option<SpanRecord> {
    let data = prompt::span_data(text)?;
    let start = data.find('{')?;
    let end = data.rfind('}')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&data[start..=end])
        .map_err(|e| debug!("Span data did not parse: {}", e))
        .ok()
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let kind = request.kind();
        debug!(?kind, explicit = request.task.is_some(), "Mock completion");

        let content = match (&request.task, kind) {
            (Some(CompletionTask::TranslateQuery { query }), _) => Self::translate(query)?,
            (Some(CompletionTask::ExplainSpan { span }), _) => Self::explain(span)?,
            (None, RequestKind::SpanExplanation) => Self::explain_prompt(&request.prompt)?,
            (None, RequestKind::QueryTranslation) => {
                let query = prompt::user_query(&request.prompt).unwrap_or(&request.prompt);
                Self::translate(query)?
            }
        };

        let tokens_used = match kind {
            RequestKind::QueryTranslation => QUERY_TOKENS,
            RequestKind::SpanExplanation => EXPLAIN_TOKENS,
        };

        Ok(CompletionResponse {
            content,
            metadata: Some(Self::metadata(tokens_used)),
        })
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn provider(&self) -> &str {
        MOCK_PROVIDER
    }
}
