use std::collections::HashMap;

use prometheus::core::Collector;
use prometheus::{Encoder, Registry, TextEncoder};

use meterwire_core::error::{MeterwireError, Result};

use crate::config::MetricsSection;

/// Content type of a text scrape.
pub const CONTENT_TYPE_004: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Process-local registry with common tags applied at gather time.
pub struct MeterRegistry {
    registry: Registry,
    latency_buckets: Vec<f64>,
}

impl MeterRegistry {
    pub fn new(cfg: &MetricsSection) -> Result<Self> {
        let labels: HashMap<String, String> = cfg
            .common_tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let labels = (!labels.is_empty()).then_some(labels);

        let registry = Registry::new_custom(cfg.prefix.clone(), labels).map_err(metrics_err)?;

        Ok(Self {
            registry,
            latency_buckets: cfg.latency_buckets.clone(),
        })
    }

    pub fn register(&self, collector: Box<dyn Collector>) -> Result<()> {
        self.registry.register(collector).map_err(metrics_err)
    }

    /// Bucket boundaries (seconds) for request timers.
    pub fn latency_buckets(&self) -> &[f64] {
        &self.latency_buckets
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode every registered family in the text exposition format.
    pub fn scrape(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).map_err(metrics_err)?;

        String::from_utf8(buffer)
            .map_err(|e| MeterwireError::Metrics(format!("scrape is not utf-8: {e}")))
    }
}

pub(crate) fn metrics_err(e: prometheus::Error) -> MeterwireError {
    MeterwireError::Metrics(e.to_string())
}
