//! Connection metrics.
//!
//! [`TrackConnections`] wraps the make-service handed to `axum::serve`. Every
//! accepted connection gets a [`ConnectionService`] holding a guard; hyper
//! drops that service when the connection closes, which closes the guard.

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::serve::IncomingStream;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts};
use tower::Service;

use meterwire_core::error::Result;

use super::registry::{metrics_err, MeterRegistry};
use super::MeterBinder;

// Connection lifetimes span keep-alive, so buckets reach further than request latency.
const CONNECTION_DURATION_BUCKETS: &[f64] = &[0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0];

#[derive(Clone)]
pub struct ConnectionMetrics {
    opened: IntCounter,
    active: IntGauge,
    max: IntGauge,
    duration: Histogram,
    high_water: Arc<AtomicI64>,
}

impl ConnectionMetrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            opened: IntCounter::with_opts(Opts::new(
                "http_server_connections_opened_total",
                "Connections accepted",
            ))
            .map_err(metrics_err)?,
            active: IntGauge::with_opts(Opts::new(
                "http_server_connections_active",
                "Connections currently open",
            ))
            .map_err(metrics_err)?,
            max: IntGauge::with_opts(Opts::new(
                "http_server_connections_max",
                "Most connections open at once",
            ))
            .map_err(metrics_err)?,
            duration: Histogram::with_opts(
                HistogramOpts::new(
                    "http_server_connection_duration_seconds",
                    "Time a connection stayed open",
                )
                .buckets(CONNECTION_DURATION_BUCKETS.to_vec()),
            )
            .map_err(metrics_err)?,
            high_water: Arc::new(AtomicI64::new(0)),
        })
    }

    /// Record an accepted connection. It stays open until the guard drops.
    pub fn open(&self, remote: SocketAddr) -> ConnectionGuard {
        self.opened.inc();
        self.active.inc();

        let now = self.active.get();
        let peak = self.high_water.fetch_max(now, Ordering::Relaxed).max(now);
        self.max.set(peak);

        tracing::debug!(%remote, active = now, "connection opened");
        ConnectionGuard {
            metrics: self.clone(),
            remote,
            opened_at: Instant::now(),
        }
    }

    pub fn opened(&self) -> u64 {
        self.opened.get()
    }

    pub fn active(&self) -> i64 {
        self.active.get()
    }

    pub fn max(&self) -> i64 {
        self.max.get()
    }
}

impl MeterBinder for ConnectionMetrics {
    fn bind_to(&self, registry: &MeterRegistry) -> Result<()> {
        registry.register(Box::new(self.opened.clone()))?;
        registry.register(Box::new(self.active.clone()))?;
        registry.register(Box::new(self.max.clone()))?;
        registry.register(Box::new(self.duration.clone()))
    }
}

pub struct ConnectionGuard {
    metrics: ConnectionMetrics,
    remote: SocketAddr,
    opened_at: Instant,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let elapsed = self.opened_at.elapsed();
        self.metrics.active.dec();
        self.metrics.duration.observe(elapsed.as_secs_f64());
        tracing::debug!(remote = %self.remote, ?elapsed, "connection closed");
    }
}

/// Make-service that records one connection per accepted stream.
#[derive(Clone)]
pub struct TrackConnections<S> {
    inner: S,
    metrics: ConnectionMetrics,
}

impl<S> TrackConnections<S> {
    pub fn new(inner: S, metrics: ConnectionMetrics) -> Self {
        Self { inner, metrics }
    }
}

impl<'a, S> Service<IncomingStream<'a>> for TrackConnections<S>
where
    S: Clone,
{
    type Response = ConnectionService<S>;
    type Error = Infallible;
    type Future = Ready<std::result::Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, stream: IncomingStream<'a>) -> Self::Future {
        let guard = self.metrics.open(stream.remote_addr());
        ready(Ok(ConnectionService {
            inner: self.inner.clone(),
            _guard: Arc::new(guard),
        }))
    }
}

/// Per-connection service; closes its connection guard when the last clone drops.
#[derive(Clone)]
pub struct ConnectionService<S> {
    inner: S,
    _guard: Arc<ConnectionGuard>,
}

impl<S, R> Service<R> for ConnectionService<S>
where
    S: Service<R>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: R) -> Self::Future {
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn guard_closes_connection_on_drop() {
        let m = ConnectionMetrics::new().unwrap();
        let a = m.open(addr(4000));
        let b = m.open(addr(4001));
        assert_eq!(m.active(), 2);
        assert_eq!(m.max(), 2);

        drop(a);
        assert_eq!(m.active(), 1);
        drop(b);
        assert_eq!(m.active(), 0);
        assert_eq!(m.opened(), 2);
        assert_eq!(m.max(), 2);
    }

    #[test]
    fn peak_survives_churn() {
        let m = ConnectionMetrics::new().unwrap();
        for port in 0..3 {
            drop(m.open(addr(5000 + port)));
        }
        assert_eq!(m.max(), 1);
        assert_eq!(m.opened(), 3);
    }
}
