//! Subcommand implementations.

pub mod explain;
pub mod samples;
pub mod search;

use anyhow::{Context, Result};
use lens_llm::{build_provider, CompletionProvider, ProviderConfig};
use serde::Serialize;
use std::sync::Arc;

/// Loads the provider configuration from the environment and builds the
/// provider.
pub fn provider() -> Result<(Arc<dyn CompletionProvider>, ProviderConfig)> {
    let config = ProviderConfig::from_env().context("Invalid provider configuration")?;
    Ok((build_provider(&config), config))
}

/// Writes a response to stdout as JSON.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
