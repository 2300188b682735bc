//! Shared application state.
//!
//! Owns the meter registry, the bound instrumentation, the exception handlers
//! and the tags strategy. Everything is built here once; nothing is global.

use std::sync::Arc;

use meterwire_core::error::Result;
use meterwire_core::tags::{RouteTagsProvider, TagsProvider};

use crate::config::AppConfig;
use crate::obs::{
    ConnectionMetrics, ExceptionHandlers, HttpServerMetrics, LoggingExceptionHandler, MeterBinder,
    MeterRegistry, MetricsExceptionHandler, ThreadPoolMetrics,
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AppConfig,
    meters: MeterRegistry,
    http: HttpServerMetrics,
    connections: ConnectionMetrics,
    exception_handlers: ExceptionHandlers,
    tags: Arc<dyn TagsProvider>,
}

impl AppState {
    /// Build state with the default route classifier.
    /// Must run inside a tokio runtime (the thread-pool binder samples it).
    pub fn new(cfg: AppConfig) -> Result<Self> {
        Self::with_tags_provider(cfg, Arc::new(RouteTagsProvider))
    }

    pub fn with_tags_provider(cfg: AppConfig, tags: Arc<dyn TagsProvider>) -> Result<Self> {
        // 1) Registry + binders
        let meters = MeterRegistry::new(&cfg.metrics)?;

        let http = HttpServerMetrics::new(meters.latency_buckets())?;
        http.bind_to(&meters)?;

        ThreadPoolMetrics::current(cfg.runtime.max_blocking_threads)?.bind_to(&meters)?;

        let connections = ConnectionMetrics::new()?;
        connections.bind_to(&meters)?;

        // 2) Exception handlers: metrics tagging for everything,
        //    plus logging for illegal arguments.
        let exception_handlers = ExceptionHandlers::new(Arc::new(MetricsExceptionHandler));
        exception_handlers.register(
            "IllegalArgumentException",
            Arc::new(LoggingExceptionHandler::new(MetricsExceptionHandler)),
        );

        tracing::debug!(
            handlers = ?exception_handlers.registered(),
            "instrumentation bound"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                meters,
                http,
                connections,
                exception_handlers,
                tags,
            }),
        })
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.inner.cfg
    }

    pub fn meters(&self) -> &MeterRegistry {
        &self.inner.meters
    }

    pub fn http_metrics(&self) -> &HttpServerMetrics {
        &self.inner.http
    }

    pub fn connections(&self) -> &ConnectionMetrics {
        &self.inner.connections
    }

    pub fn exception_handlers(&self) -> &ExceptionHandlers {
        &self.inner.exception_handlers
    }

    pub fn tags_provider(&self) -> &dyn TagsProvider {
        self.inner.tags.as_ref()
    }
}
