//! Error types for provider operations.

use thiserror::Error;

/// Errors that can occur while talking to a completion provider.
#[derive(Debug, Error)]
pub enum Error {
    /// Model output could not be turned into the expected JSON.
    #[error("failed to parse model output: {reason}")]
    Parse {
        /// What went wrong.
        reason: String,
        /// The unmodified model output, kept for diagnostics.
        raw: String,
    },

    /// The provider cannot serve requests.
    #[error("provider '{0}' is not configured")]
    NotConfigured(String),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The provider failed to produce a completion.
    #[error("completion failed: {0}")]
    Provider(String),

    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a parse error that keeps the raw model output.
    pub fn parse(reason: impl Into<String>, raw: &str) -> Self {
        Self::Parse {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;
