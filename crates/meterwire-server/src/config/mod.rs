//! Config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use meterwire_core::error::{MeterwireError, Result};

pub use schema::{AppConfig, MetricsSection, RuntimeSection, ServerSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "METERWIRE_CONFIG";
/// Config file used when the variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "meterwire.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        MeterwireError::Internal(format!("read config failed ({}): {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = serde_yaml::from_str(s)
        .map_err(|e| MeterwireError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `$METERWIRE_CONFIG` (or `meterwire.yaml`), falling back to defaults
/// when the file does not exist.
pub fn load() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        tracing::info!(%path, "loading config");
        load_from_file(&path)
    } else {
        tracing::info!(%path, "config file not found, using defaults");
        let cfg = AppConfig::default();
        cfg.validate()?;
        Ok(cfg)
    }
}
