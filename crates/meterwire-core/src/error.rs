//! Shared error type across meterwire crates.

use thiserror::Error;

use crate::exception::Exception;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input or configuration.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterwireError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum MeterwireError {
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("metrics: {0}")]
    Metrics(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeterwireError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MeterwireError::IllegalArgument(_) => ClientCode::BadRequest,
            MeterwireError::InvalidConfig(_) => ClientCode::BadRequest,
            MeterwireError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            MeterwireError::Metrics(_) => ClientCode::Internal,
            MeterwireError::Internal(_) => ClientCode::Internal,
        }
    }
}

impl Exception for MeterwireError {
    fn simple_name(&self) -> &str {
        match self {
            MeterwireError::IllegalArgument(_) => "IllegalArgumentException",
            MeterwireError::InvalidConfig(_) => "InvalidConfigException",
            MeterwireError::UnsupportedVersion => "UnsupportedVersionException",
            MeterwireError::Metrics(_) => "MetricsException",
            MeterwireError::Internal(_) => "InternalException",
        }
    }
}
