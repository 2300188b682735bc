//! meterwire sample server
//!
//! - Sample routes: /, /hello/:name, /boom, /hi/:name
//! - Scrape endpoint: /prometheus
//! - Request timer labelled by route template and exception

use tracing_subscriber::{fmt, EnvFilter};

use meterwire_server::{config, runtime, server};

fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load().expect("config load failed");
    let rt = runtime::build(&cfg.runtime).expect("runtime build failed");

    if let Err(e) = rt.block_on(server::run(cfg)) {
        tracing::error!(error = %e, "meterwire-server exited");
        std::process::exit(1);
    }
}
