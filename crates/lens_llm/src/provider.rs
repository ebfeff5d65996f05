//! The completion provider boundary.

use crate::error::Result;
use crate::prompt::SPAN_DATA_MARKER;
use async_trait::async_trait;
use lens_model::SpanRecord;
use serde::{Deserialize, Serialize};

/// What a completion request asks for, stated explicitly.
///
/// Providers that understand the task use it directly. Text-only providers
/// ignore it and read the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionTask {
    /// Translate a natural-language query into search parameters.
    TranslateQuery {
        /// The query as the user typed it.
        query: String,
    },
    /// Explain a single span.
    ExplainSpan {
        /// The span to explain.
        span: Box<SpanRecord>,
    },
}

/// The two kinds of request a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Natural language to search parameters.
    QueryTranslation,
    /// Span to explanation.
    SpanExplanation,
}

impl RequestKind {
    /// Infers the request kind from prompt text.
    ///
    /// Any prompt containing the span data marker is an explanation request.
    pub fn sniff(prompt: &str) -> Self {
        if prompt.contains(SPAN_DATA_MARKER) {
            Self::SpanExplanation
        } else {
            Self::QueryTranslation
        }
    }
}

/// A request for a single completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
    /// Model override.
    pub model: Option<String>,
    /// Explicit task, when the caller knows it.
    pub task: Option<CompletionTask>,
}

impl CompletionRequest {
    /// Creates a request with only a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
            model: None,
            task: None,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the token limit.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attaches the explicit task.
    #[must_use]
    pub fn with_task(mut self, task: CompletionTask) -> Self {
        self.task = Some(task);
        self
    }

    /// Returns the request kind, preferring the explicit task over the
    /// prompt marker.
    pub fn kind(&self) -> RequestKind {
        match &self.task {
            Some(CompletionTask::TranslateQuery { .. }) => RequestKind::QueryTranslation,
            Some(CompletionTask::ExplainSpan { .. }) => RequestKind::SpanExplanation,
            None => RequestKind::sniff(&self.prompt),
        }
    }
}

/// Provider details attached to a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Model that produced the content.
    pub model: String,
    /// Tokens consumed, as reported by the provider.
    pub tokens_used: u32,
    /// Provider name.
    pub provider: String,
}

/// The raw result of a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated text. Expected to contain JSON, possibly wrapped.
    pub content: String,
    /// Provider details, if reported.
    pub metadata: Option<ResponseMetadata>,
}

/// A backend that turns prompts into text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produces a completion for the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not configured or fails.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Returns true if the provider can serve requests.
    fn is_configured(&self) -> bool;

    /// Returns the provider name reported in response metadata.
    fn provider(&self) -> &str;
}
