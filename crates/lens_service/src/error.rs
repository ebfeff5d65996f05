//! Error types for the Lens services.

use thiserror::Error;

/// Errors returned to callers of the query and explain services.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input or translated parameters are missing a field or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Provider output could not be read as the expected JSON.
    #[error("failed to parse provider response: {reason}")]
    Parse {
        /// What went wrong.
        reason: String,
        /// The unmodified provider output.
        raw: String,
    },

    /// The provider is not configured.
    #[error("provider not configured: {0}")]
    Configuration(String),

    /// The provider failed to produce a completion.
    #[error("provider error: {0}")]
    Provider(String),

    /// Serialization of an internal value failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a parse error that keeps the raw provider output.
    pub fn parse(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Returns a short machine-readable name for the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Parse { .. } => "ParseError",
            Self::Configuration(_) => "ConfigurationError",
            Self::Provider(_) => "ProviderError",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl From<lens_model::Error> for Error {
    fn from(err: lens_model::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<lens_llm::Error> for Error {
    fn from(err: lens_llm::Error) -> Self {
        match err {
            lens_llm::Error::Parse { reason, raw } => Self::Parse { reason, raw },
            lens_llm::Error::NotConfigured(provider) => {
                Self::Configuration(format!("provider '{provider}' is not configured"))
            }
            lens_llm::Error::Config(reason) => Self::Configuration(reason),
            lens_llm::Error::Provider(reason) => Self::Provider(reason),
            lens_llm::Error::Json(err) => Self::Internal(err.to_string()),
        }
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, Error>;
