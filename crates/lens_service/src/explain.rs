//! Span explanation.

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use lens_llm::{
    extract, prompt, CompletionProvider, CompletionRequest, CompletionTask, ProviderConfig,
};
use lens_model::{ExplanationResult, SpanRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// A span to explain.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainRequest {
    span: SpanRecord,
}

impl ExplainRequest {
    /// Wraps a span after checking its identifiers and names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required identifier or name is empty.
    pub fn new(span: SpanRecord) -> Result<Self> {
        span.validate()?;
        Ok(Self { span })
    }

    /// Reads a request body of the form `{"span": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the span is absent or malformed.
    pub fn from_value(mut body: Value) -> Result<Self> {
        let span = body
            .get_mut("span")
            .map(Value::take)
            .ok_or_else(|| Error::Validation("missing required field: span".to_string()))?;
        Self::from_span_value(span)
    }

    /// Reads a bare span object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the span is malformed.
    pub fn from_span_value(span: Value) -> Result<Self> {
        Ok(Self {
            span: SpanRecord::from_value(span)?,
        })
    }

    /// The validated span.
    pub const fn span(&self) -> &SpanRecord {
        &self.span
    }
}

/// Identifies the explained span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanContext {
    /// Span identifier.
    #[serde(rename = "spanID")]
    pub span_id: String,
    /// Trace identifier.
    #[serde(rename = "traceID")]
    pub trace_id: String,
}

/// An explained span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainResponse {
    /// The explanation.
    pub explanation: ExplanationResult,
    /// Which span was explained.
    pub span_context: SpanContext,
    /// Provider and timing.
    pub metadata: Metadata,
}

/// Produces structured explanations of spans.
pub struct ExplainService {
    provider: Arc<dyn CompletionProvider>,
    config: ProviderConfig,
}

impl ExplainService {
    /// Creates a service backed by the given provider.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_config(provider, ProviderConfig::default())
    }

    /// Creates a service with explicit request options.
    pub fn with_config(provider: Arc<dyn CompletionProvider>, config: ProviderConfig) -> Self {
        Self { provider, config }
    }

    /// Explains a span.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Error::Configuration`] if the provider is not configured
    /// - [`Error::Parse`] if the provider output is not an explanation
    pub async fn explain(&self, request: ExplainRequest) -> Result<ExplainResponse> {
        let start = Instant::now();
        let span = request.span;
        info!(
            span_id = %span.span_id,
            trace_id = %span.trace_id,
            parent = span.parent_span_id(),
            start_time = ?span.start_time(),
            operation = %span.operation_name,
            "Explaining span"
        );

        if !self.provider.is_configured() {
            return Err(Error::Configuration(format!(
                "provider '{}' is not configured",
                self.provider.provider()
            )));
        }

        let prompt = prompt::span_explanation(&span)?;
        let span_context = SpanContext {
            span_id: span.span_id.clone(),
            trace_id: span.trace_id.clone(),
        };
        let completion = self.config.apply(
            CompletionRequest::new(prompt).with_task(CompletionTask::ExplainSpan {
                span: Box::new(span),
            }),
            self.config.explain_max_tokens,
        );
        let response = self.provider.complete(&completion).await?;

        let explanation = parse_explanation(&response.content)?;

        let metadata = Metadata::since(self.provider.provider(), start);
        info!(
            span_id = %span_context.span_id,
            span_type = %explanation.span_type,
            has_error = explanation.has_error(),
            processing_time_ms = metadata.processing_time_ms,
            "Span explained"
        );

        Ok(ExplainResponse {
            explanation,
            span_context,
            metadata,
        })
    }
}

fn parse_explanation(raw: &str) -> Result<ExplanationResult> {
    let parsed = extract::parse::<ExplanationResult>(raw)
        .map_err(Error::from)
        .and_then(|explanation| {
            explanation
                .validate()
                .map_err(|e| Error::parse(e.to_string(), raw))?;
            Ok(explanation)
        });

    match parsed {
        Ok(mut explanation) => {
            explanation.truncate_key_details();
            Ok(explanation)
        }
        Err(e) => {
            error!(response = raw, error = %e, "Failed to parse provider response");
            Err(e)
        }
    }
}
