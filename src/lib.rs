pub mod config;
pub mod error;
pub mod estimator;
pub mod generator;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pdf;
pub mod pricing;
pub mod providers;
pub mod report;
pub mod retry;
pub mod server;
pub mod signals;
pub mod storage;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `level`. `format` is `json` or `text`.
/// Can only be called once per process.
pub fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
