use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;
use meterwire_core::error::{MeterwireError, Result};
use meterwire_core::tags::LabelSet;

/// Labels every request sample already carries; common tags must not reuse them.
const RESERVED_LABELS: [&str; 3] = ["method", "status", "outcome"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub runtime: RuntimeSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            runtime: RuntimeSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeterwireError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.runtime.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            MeterwireError::InvalidConfig(format!(
                "server.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    /// Worker threads; tokio's default (one per core) when unset.
    #[serde(default)]
    pub worker_threads: Option<usize>,

    #[serde(default = "default_max_blocking_threads")]
    pub max_blocking_threads: usize,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_blocking_threads: default_max_blocking_threads(),
        }
    }
}

impl RuntimeSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.worker_threads {
            if !(1..=1024).contains(&n) {
                return Err(MeterwireError::InvalidConfig(
                    "runtime.worker_threads must be between 1 and 1024".into(),
                ));
            }
        }
        if !(1..=4096).contains(&self.max_blocking_threads) {
            return Err(MeterwireError::InvalidConfig(
                "runtime.max_blocking_threads must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_blocking_threads() -> usize {
    512
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Prepended to every metric name as `<prefix>_`.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Constant labels attached to every sample.
    #[serde(default)]
    pub common_tags: BTreeMap<String, String>,

    /// Request timer buckets, in seconds.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            prefix: None,
            common_tags: BTreeMap::new(),
            latency_buckets: default_latency_buckets(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.prefix {
            if !is_valid_name(prefix) {
                return Err(MeterwireError::InvalidConfig(format!(
                    "metrics.prefix is not a valid metric name: {prefix:?}"
                )));
            }
        }

        for name in self.common_tags.keys() {
            if !is_valid_name(name) || name.starts_with("__") {
                return Err(MeterwireError::InvalidConfig(format!(
                    "metrics.common_tags has an invalid label name: {name:?}"
                )));
            }
            if RESERVED_LABELS.contains(&name.as_str()) || LabelSet::KEYS.contains(&name.as_str()) {
                return Err(MeterwireError::InvalidConfig(format!(
                    "metrics.common_tags must not override request label {name:?}"
                )));
            }
        }

        if self.latency_buckets.is_empty() {
            return Err(MeterwireError::InvalidConfig(
                "metrics.latency_buckets must not be empty".into(),
            ));
        }
        let finite = self.latency_buckets.iter().all(|b| b.is_finite() && *b > 0.0);
        let increasing = self.latency_buckets.windows(2).all(|w| w[0] < w[1]);
        if !finite || !increasing {
            return Err(MeterwireError::InvalidConfig(
                "metrics.latency_buckets must be positive and strictly increasing".into(),
            ));
        }

        Ok(())
    }
}

// 1ms → 10s.
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ]
}

fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
