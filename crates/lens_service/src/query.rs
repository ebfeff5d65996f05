//! Natural-language query translation.

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use lens_llm::{
    extract, prompt, CompletionProvider, CompletionRequest, CompletionTask, ProviderConfig,
};
use lens_model::SearchParameters;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Optional hints that accompany a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    /// Services the user looked at recently.
    #[serde(default)]
    pub recent_services: Vec<String>,
    /// Service to use when the query names none.
    #[serde(default)]
    pub default_service: Option<String>,
}

/// A query to translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// The query as the user typed it.
    pub query: String,
    /// Optional hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<QueryContext>,
}

impl TranslateRequest {
    /// Creates a request without context.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: None,
        }
    }

    /// Sets the fallback service.
    #[must_use]
    pub fn with_default_service(mut self, service: impl Into<String>) -> Self {
        self.context.get_or_insert_with(QueryContext::default).default_service =
            Some(service.into());
        self
    }

    fn default_service(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|context| context.default_service.as_deref())
            .map(str::trim)
            .filter(|service| !service.is_empty())
    }
}

/// A translated query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    /// Search parameters ready for the Jaeger query API.
    pub params: SearchParameters,
    /// The query as received.
    pub original_query: String,
    /// Provider and timing.
    pub metadata: Metadata,
}

/// Translates natural-language queries into search parameters.
pub struct QueryService {
    provider: Arc<dyn CompletionProvider>,
    config: ProviderConfig,
}

impl QueryService {
    /// Creates a service backed by the given provider.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_config(provider, ProviderConfig::default())
    }

    /// Creates a service with explicit request options.
    pub fn with_config(provider: Arc<dyn CompletionProvider>, config: ProviderConfig) -> Self {
        Self { provider, config }
    }

    /// Translates a query.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Error::Validation`] for an empty query or parameters without a
    ///   service or with malformed values
    /// - [`Error::Configuration`] if the provider is not configured
    /// - [`Error::Parse`] if the provider output is not a JSON object
    pub async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse> {
        let start = Instant::now();
        info!(query = %request.query, "Translating query");

        if request.query.trim().is_empty() {
            return Err(Error::Validation("query cannot be empty".to_string()));
        }
        if !self.provider.is_configured() {
            return Err(Error::Configuration(format!(
                "provider '{}' is not configured",
                self.provider.provider()
            )));
        }

        let completion = self.config.apply(
            CompletionRequest::new(prompt::query_translation(&request.query)).with_task(
                CompletionTask::TranslateQuery {
                    query: request.query.clone(),
                },
            ),
            self.config.query_max_tokens,
        );
        let response = self.provider.complete(&completion).await?;

        let mut params = parse_params(&response.content)?;

        if params.has_unknown_service() {
            if let Some(service) = request.default_service() {
                info!(service, "Using default service from context");
                params.service = service.to_string();
            }
        }

        params.validate().map_err(|e| {
            error!(?params, error = %e, "Provider produced invalid search parameters");
            Error::from(e)
        })?;

        let metadata = Metadata::since(self.provider.provider(), start);
        info!(
            service = %params.service,
            processing_time_ms = metadata.processing_time_ms,
            "Query translated"
        );

        Ok(TranslateResponse {
            params,
            original_query: request.query,
            metadata,
        })
    }
}

/// Reads search parameters from provider output, defaulting absent fields.
fn parse_params(raw: &str) -> Result<SearchParameters> {
    let value = extract::extract_json(raw).map_err(|e| {
        error!(response = raw, error = %e, "Failed to parse provider response");
        Error::from(e)
    })?;

    let has_service = value
        .get("service")
        .and_then(Value::as_str)
        .is_some_and(|service| !service.trim().is_empty());
    if !has_service {
        warn!(response = raw, "Provider did not return a service");
        return Err(Error::Validation(
            "service name is required but was not extracted".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| Error::parse(e.to_string(), raw))
}
