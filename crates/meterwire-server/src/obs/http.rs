//! Request timer, the metrics behind the timing middleware.

use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntGauge, Opts};

use meterwire_core::error::Result;
use meterwire_core::tags::{LabelSet, RequestOutcome};

use super::registry::{metrics_err, MeterRegistry};
use super::MeterBinder;

const REQUEST_LABELS: [&str; 5] = ["method", "status", "outcome", "route", "exception"];

#[derive(Clone)]
pub struct HttpServerMetrics {
    requests: HistogramVec,
    active: IntGauge,
}

impl HttpServerMetrics {
    pub fn new(buckets: &[f64]) -> Result<Self> {
        let opts = HistogramOpts::new("http_server_requests_seconds", "HTTP server request latency")
            .buckets(buckets.to_vec());
        let requests = HistogramVec::new(opts, &REQUEST_LABELS).map_err(metrics_err)?;

        let active = IntGauge::with_opts(Opts::new(
            "http_server_requests_active",
            "HTTP requests currently being handled",
        ))
        .map_err(metrics_err)?;

        Ok(Self { requests, active })
    }

    /// Count a request as in flight until the guard drops.
    pub fn start(&self) -> ActiveRequest {
        self.active.inc();
        ActiveRequest {
            active: self.active.clone(),
        }
    }

    pub fn record(&self, method: &str, outcome: &RequestOutcome<'_>, labels: &LabelSet, elapsed: Duration) {
        let status = outcome.status.to_string();
        self.requests
            .with_label_values(&[
                method,
                &status,
                outcome.outcome().as_str(),
                labels.route(),
                labels.exception(),
            ])
            .observe(elapsed.as_secs_f64());
    }

    pub fn active(&self) -> i64 {
        self.active.get()
    }

    /// Number of samples recorded under the given labels.
    pub fn sample_count(&self, method: &str, status: u16, labels: &LabelSet) -> u64 {
        let status = status.to_string();
        let wanted = [
            ("method", method),
            ("status", status.as_str()),
            ("route", labels.route()),
            ("exception", labels.exception()),
        ];

        let families = self.requests.collect();
        families
            .iter()
            .flat_map(|family| family.get_metric())
            .filter(|metric| {
                wanted.iter().all(|(name, value)| {
                    metric
                        .get_label()
                        .iter()
                        .any(|pair| pair.get_name() == *name && pair.get_value() == *value)
                })
            })
            .map(|metric| metric.get_histogram().get_sample_count())
            .sum()
    }
}

impl MeterBinder for HttpServerMetrics {
    fn bind_to(&self, registry: &MeterRegistry) -> Result<()> {
        registry.register(Box::new(self.requests.clone()))?;
        registry.register(Box::new(self.active.clone()))
    }
}

pub struct ActiveRequest {
    active: IntGauge,
}

impl Drop for ActiveRequest {
    fn drop(&mut self) {
        self.active.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterwire_core::tags::classify;

    #[test]
    fn active_gauge_tracks_guards() {
        let m = HttpServerMetrics::new(&[0.1, 1.0]).unwrap();
        let a = m.start();
        let b = m.start();
        assert_eq!(m.active(), 2);
        drop(a);
        drop(b);
        assert_eq!(m.active(), 0);
    }

    #[test]
    fn record_lands_under_request_labels() {
        let m = HttpServerMetrics::new(&[0.1, 1.0]).unwrap();
        let outcome = RequestOutcome::new(Some("/hello/:name"), 200, None);
        let labels = classify(outcome.matched_path, outcome.status, outcome.exception);

        m.record("GET", &outcome, &labels, Duration::from_millis(3));
        m.record("GET", &outcome, &labels, Duration::from_millis(5));

        assert_eq!(m.sample_count("GET", 200, &labels), 2);
        assert_eq!(m.sample_count("POST", 200, &labels), 0);
    }
}
