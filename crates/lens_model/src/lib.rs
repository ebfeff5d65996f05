//! Data model for Lens.
//!
//! This crate provides:
//! - Jaeger span records with tags, logs and references
//! - Search parameters accepted by the Jaeger query API
//! - Structured span explanations
//! - Sample spans for tests and demos
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_model::SpanRecord;
//!
//! let span = SpanRecord::from_value(serde_json::from_str(body)?)?;
//! println!("{} took {}", span.operation_name, span.format_duration());
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod explanation;
pub mod fixtures;
pub mod search;
pub mod span;

pub use error::{Error, Result};
pub use explanation::{Assessment, ErrorInfo, ExplanationResult, Performance};
pub use search::SearchParameters;
pub use span::{LogEvent, Process, RefType, SpanRecord, SpanReference, Tag, TagValue};
