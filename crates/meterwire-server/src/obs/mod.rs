//! Metrics wiring.
//!
//! The `prometheus` crate stores and serializes samples. This module owns the
//! registry, the binders that feed it, and the middleware that times requests
//! and carries exception names to the timer.

pub mod connection;
pub mod exception;
pub mod http;
pub mod registry;
pub mod thread_pool;
pub mod timed;

use meterwire_core::error::Result;

pub use connection::{ConnectionMetrics, TrackConnections};
pub use exception::{ExceptionHandler, ExceptionHandlers, LoggingExceptionHandler, MetricsExceptionHandler};
pub use http::HttpServerMetrics;
pub use registry::MeterRegistry;
pub use thread_pool::ThreadPoolMetrics;

/// A group of related collectors registered once at startup.
pub trait MeterBinder {
    fn bind_to(&self, registry: &MeterRegistry) -> Result<()>;
}
