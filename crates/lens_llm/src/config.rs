//! Provider configuration.

use crate::error::{Error, Result};
use crate::mock::{MockProvider, MOCK_MODEL, MOCK_PROVIDER};
use crate::provider::{CompletionProvider, CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Which provider to use and how to call it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Provider name. Only `mock` is built in.
    pub provider: String,
    /// Model requested from the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token limit for query translation.
    pub query_max_tokens: u32,
    /// Token limit for span explanation.
    pub explain_max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: MOCK_PROVIDER.to_string(),
            model: MOCK_MODEL.to_string(),
            temperature: 0.0,
            query_max_tokens: 500,
            explain_max_tokens: 800,
        }
    }
}

impl ProviderConfig {
    /// Reads the configuration from `LENS_*` environment variables, falling
    /// back to the defaults for unset ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(provider) = var("LENS_PROVIDER") {
            config.provider = provider.to_lowercase();
        }
        if let Some(model) = var("LENS_MODEL") {
            config.model = model;
        }
        if let Some(raw) = var("LENS_TEMPERATURE") {
            config.temperature = parse_value("LENS_TEMPERATURE", &raw)?;
            if !(0.0..=2.0).contains(&config.temperature) {
                return Err(Error::Config(format!(
                    "LENS_TEMPERATURE must be between 0 and 2, got {raw}"
                )));
            }
        }
        if let Some(raw) = var("LENS_QUERY_MAX_TOKENS") {
            config.query_max_tokens = parse_tokens("LENS_QUERY_MAX_TOKENS", &raw)?;
        }
        if let Some(raw) = var("LENS_EXPLAIN_MAX_TOKENS") {
            config.explain_max_tokens = parse_tokens("LENS_EXPLAIN_MAX_TOKENS", &raw)?;
        }

        Ok(config)
    }

    /// Applies the configured options to a request.
    #[must_use]
    pub fn apply(&self, request: CompletionRequest, max_tokens: u32) -> CompletionRequest {
        request
            .with_model(self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(max_tokens)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("{key}={raw}: {e}")))
}

fn parse_tokens(key: &str, raw: &str) -> Result<u32> {
    let tokens: u32 = parse_value(key, raw)?;
    if tokens == 0 {
        return Err(Error::Config(format!("{key} must be greater than zero")));
    }
    Ok(tokens)
}

/// Builds the provider named in the configuration.
///
/// Unknown provider names give an [`UnconfiguredProvider`], so the problem
/// surfaces as a configuration error on first use.
pub fn build_provider(config: &ProviderConfig) -> Arc<dyn CompletionProvider> {
    if config.provider == MOCK_PROVIDER {
        info!(model = %config.model, "Using mock completion provider");
        Arc::new(MockProvider::new())
    } else {
        warn!(provider = %config.provider, "No built-in provider with this name");
        Arc::new(UnconfiguredProvider::new(config.provider.clone()))
    }
}

/// A provider that cannot serve requests.
#[derive(Debug, Clone)]
pub struct UnconfiguredProvider {
    name: String,
}

impl UnconfiguredProvider {
    /// Creates an unconfigured provider with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl CompletionProvider for UnconfiguredProvider {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
        Err(Error::NotConfigured(self.name.clone()))
    }

    fn is_configured(&self) -> bool {
        false
    }

    fn provider(&self) -> &str {
        &self.name
    }
}
