//! Rule-based stand-ins for a language model.
//!
//! This crate provides:
//! - Natural language to Jaeger search parameter translation
//! - Span analysis producing a structured explanation
//!
//! Both engines are pure functions: the same input always yields the same
//! output and unmatched patterns degrade to defaults instead of failing.
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_rules::{explain, translate};
//!
//! let params = translate::extract("errors in user-api from the last hour");
//! assert_eq!(params.service, "user-api");
//!
//! let explanation = explain::analyze(&span);
//! println!("{}", explanation.summary);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod explain;
pub mod translate;

pub use explain::{analyze, SpanType, Thresholds};
pub use translate::extract;
