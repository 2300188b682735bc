//! Exception naming.
//!
//! An error that reaches the exception hook is captured as a
//! [`RecordedException`]. Its label is what the timer records under the
//! `exception` key.

use std::error::Error;

/// An error that can be named in metrics.
pub trait Exception: Error {
    /// Short type name, e.g. `IllegalArgumentException`. May be blank.
    fn simple_name(&self) -> &str;

    /// Fully qualified type name, used when the simple name is blank.
    fn qualified_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Snapshot of an exception taken when a handler fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedException {
    simple_name: String,
    qualified_name: String,
    message: String,
}

impl RecordedException {
    pub fn new(
        simple_name: impl Into<String>,
        qualified_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            simple_name: simple_name.into(),
            qualified_name: qualified_name.into(),
            message: message.into(),
        }
    }

    /// Capture name and message of a live error.
    pub fn capture<E: Exception + ?Sized>(err: &E) -> Self {
        Self::new(err.simple_name(), err.qualified_name(), err.to_string())
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Simple name if non-blank, otherwise the qualified name.
    pub fn label(&self) -> &str {
        if self.simple_name.trim().is_empty() {
            &self.qualified_name
        } else {
            &self.simple_name
        }
    }
}
