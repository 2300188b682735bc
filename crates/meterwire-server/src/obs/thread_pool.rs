//! Tokio runtime gauges, sampled at scrape time.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGauge, Opts};
use tokio::runtime::Handle;

use meterwire_core::error::{MeterwireError, Result};

use super::registry::{metrics_err, MeterRegistry};
use super::MeterBinder;

#[derive(Clone)]
pub struct ThreadPoolMetrics {
    handle: Handle,
    workers: IntGauge,
    tasks_alive: IntGauge,
    global_queue_depth: IntGauge,
    blocking_threads_max: IntGauge,
}

impl ThreadPoolMetrics {
    /// Bind to the runtime driving the caller.
    pub fn current(max_blocking_threads: usize) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| MeterwireError::Internal(format!("no tokio runtime: {e}")))?;
        Self::new(handle, max_blocking_threads)
    }

    pub fn new(handle: Handle, max_blocking_threads: usize) -> Result<Self> {
        let gauge = |name: &str, help: &str| IntGauge::with_opts(Opts::new(name, help)).map_err(metrics_err);

        let blocking_threads_max = gauge(
            "runtime_blocking_threads_config_max",
            "Configured upper bound of blocking threads",
        )?;
        blocking_threads_max.set(i64::try_from(max_blocking_threads).unwrap_or(i64::MAX));

        Ok(Self {
            handle,
            workers: gauge("runtime_workers", "Worker threads of the runtime")?,
            tasks_alive: gauge("runtime_tasks_alive", "Tasks spawned and not yet completed")?,
            global_queue_depth: gauge(
                "runtime_global_queue_depth",
                "Tasks waiting in the runtime's global queue",
            )?,
            blocking_threads_max,
        })
    }

    fn gauges(&self) -> [&IntGauge; 4] {
        [
            &self.workers,
            &self.tasks_alive,
            &self.global_queue_depth,
            &self.blocking_threads_max,
        ]
    }

    fn sample(&self) {
        let m = self.handle.metrics();
        self.workers.set(to_i64(m.num_workers()));
        self.tasks_alive.set(to_i64(m.num_alive_tasks()));
        self.global_queue_depth.set(to_i64(m.global_queue_depth()));
    }
}

fn to_i64(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

impl Collector for ThreadPoolMetrics {
    fn desc(&self) -> Vec<&Desc> {
        self.gauges().into_iter().flat_map(|g| g.desc()).collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.sample();
        self.gauges().into_iter().flat_map(|g| g.collect()).collect()
    }
}

impl MeterBinder for ThreadPoolMetrics {
    fn bind_to(&self, registry: &MeterRegistry) -> Result<()> {
        registry.register(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsSection;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reports_runtime_workers() {
        let registry = MeterRegistry::new(&MetricsSection::default()).unwrap();
        ThreadPoolMetrics::current(64).unwrap().bind_to(&registry).unwrap();

        let body = registry.scrape().unwrap();
        assert!(body.contains("runtime_workers 2"), "{body}");
        assert!(body.contains("runtime_blocking_threads_config_max 64"), "{body}");
        assert!(body.contains("runtime_tasks_alive"), "{body}");
    }

    #[test]
    fn requires_a_runtime() {
        assert!(ThreadPoolMetrics::current(1).is_err());
    }
}
