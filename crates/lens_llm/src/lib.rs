//! Language model boundary for Lens.
//!
//! This crate provides:
//! - The [`CompletionProvider`] trait every backend implements
//! - A deterministic, rule-based provider ([`MockProvider`])
//! - Prompt building for query translation and span explanation
//! - Recovery of JSON from free-form model output
//! - Provider configuration from the environment
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_llm::{extract, prompt, CompletionProvider, CompletionRequest, MockProvider};
//!
//! let provider = MockProvider::new();
//! let request = CompletionRequest::new(prompt::query_translation("errors in checkout"));
//! let response = provider.complete(&request).await?;
//! let params: lens_model::SearchParameters = extract::parse(&response.content)?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod extract;
pub mod mock;
pub mod prompt;
pub mod provider;

pub use config::{build_provider, ProviderConfig, UnconfiguredProvider};
pub use error::{Error, Result};
pub use mock::MockProvider;
pub use provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, CompletionTask, RequestKind,
    ResponseMetadata,
};
