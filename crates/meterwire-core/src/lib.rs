//! meterwire core: request tagging policy and the exception model.
//!
//! This crate decides which labels an HTTP exchange is recorded under and how
//! an error is named once it reaches the metrics pipeline. It carries no
//! runtime, HTTP, or metrics-library dependencies so the policy can be reused
//! and tested on its own.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Classification
//! degrades to sentinel labels instead of failing.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exception;
pub mod tags;

/// Shared result type.
pub use error::{MeterwireError, Result};
pub use exception::{Exception, RecordedException};
pub use tags::{classify, LabelSet, Outcome, RequestOutcome, RouteTagsProvider, TagsProvider};
