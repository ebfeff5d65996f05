//! Response metadata shared by both services.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Which provider answered and how long the whole call took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Provider name.
    pub provider: String,
    /// Wall-clock time spent in the service, in milliseconds.
    pub processing_time_ms: u64,
}

impl Metadata {
    /// Captures the provider name and the time elapsed since `start`.
    pub fn since(provider: &str, start: Instant) -> Self {
        Self {
            provider: provider.to_string(),
            processing_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}
