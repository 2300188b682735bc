//! Tokio runtime built from config.

use tokio::runtime::{Builder, Runtime};

use meterwire_core::error::{MeterwireError, Result};

use crate::config::RuntimeSection;

pub fn build(cfg: &RuntimeSection) -> Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder
        .enable_all()
        .thread_name("meterwire-worker")
        .max_blocking_threads(cfg.max_blocking_threads);
    if let Some(n) = cfg.worker_threads {
        builder.worker_threads(n);
    }

    builder
        .build()
        .map_err(|e| MeterwireError::Internal(format!("runtime build failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn honours_worker_threads() {
        let cfg = RuntimeSection {
            worker_threads: Some(3),
            max_blocking_threads: 8,
        };
        let rt = build(&cfg).unwrap();
        assert_eq!(rt.metrics().num_workers(), 3);
    }
}
