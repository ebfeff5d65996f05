//! Query translation and span explanation services for Lens.
//!
//! This crate provides:
//! - [`QueryService`]: natural language to Jaeger search parameters
//! - [`ExplainService`]: span to structured explanation
//!
//! Both take their [`lens_llm::CompletionProvider`] at construction, send it
//! a prompt, recover JSON from whatever comes back and validate it before
//! returning.
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_llm::{build_provider, ProviderConfig};
//! use lens_service::{QueryService, TranslateRequest};
//!
//! let config = ProviderConfig::from_env()?;
//! let service = QueryService::with_config(build_provider(&config), config);
//! let response = service.translate(TranslateRequest::new("errors in checkout")).await?;
//! println!("{}", response.params.service);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod explain;
pub mod metadata;
pub mod query;

pub use error::{Error, Result};
pub use explain::{ExplainRequest, ExplainResponse, ExplainService, SpanContext};
pub use metadata::Metadata;
pub use query::{QueryContext, QueryService, TranslateRequest, TranslateResponse};
