//! Explain command implementation.

use super::{print_json, provider};
use anyhow::{bail, Context, Result};
use lens_model::fixtures;
use lens_service::{ExplainRequest, ExplainService};
use serde_json::Value;
use std::fs;
use std::io::Read;
use tracing::info;

/// Runs the explain command.
pub async fn run(span_path: Option<&str>, sample: Option<&str>, pretty: bool) -> Result<()> {
    let request = match (span_path, sample) {
        (_, Some(name)) => sample_request(name)?,
        (Some(path), None) => file_request(path)?,
        (None, None) => bail!("Pass --span FILE, --span - or --sample NAME"),
    };

    let (provider, config) = provider()?;
    let service = ExplainService::with_config(provider, config);
    let response = service
        .explain(request)
        .await
        .context("Failed to explain span")?;

    print_json(&response, pretty)
}

fn sample_request(name: &str) -> Result<ExplainRequest> {
    let span = fixtures::by_name(name).with_context(|| {
        format!(
            "Unknown sample '{name}', expected one of: {}",
            fixtures::NAMES.join(", ")
        )
    })?;
    info!("Explaining sample span: {}", name);
    Ok(ExplainRequest::new(span)?)
}

fn file_request(path: &str) -> Result<ExplainRequest> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read span from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read span file: {path}"))?
    };

    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {path}"))?;
    parse_body(value).with_context(|| format!("Invalid span in {path}"))
}

/// Accepts either `{"span": {...}}` or a bare span object.
fn parse_body(value: Value) -> lens_service::Result<ExplainRequest> {
    if value.get("span").is_some() {
        ExplainRequest::from_value(value)
    } else {
        ExplainRequest::from_span_value(value)
    }
}
