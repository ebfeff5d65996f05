//! Search command implementation.

use super::{print_json, provider};
use anyhow::{Context, Result};
use lens_service::{QueryService, TranslateRequest};
use tracing::info;

/// Runs the search command.
pub async fn run(query: &str, default_service: Option<&str>, pretty: bool) -> Result<()> {
    let (provider, config) = provider()?;
    let service = QueryService::with_config(provider, config);

    let mut request = TranslateRequest::new(query);
    if let Some(default_service) = default_service {
        request = request.with_default_service(default_service);
    }

    let response = service
        .translate(request)
        .await
        .with_context(|| format!("Failed to translate query: {query}"))?;

    if response.params.has_unknown_service() {
        info!("No service recognized in query; pass --default-service to pick one");
    }

    print_json(&response, pretty)
}
