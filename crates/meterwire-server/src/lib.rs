//! meterwire server library entry.
//!
//! Wires the meter registry, instrumentation binders, exception hook and
//! request timer around a handful of sample routes. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod routes;
pub mod runtime;
pub mod server;
