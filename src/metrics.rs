use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
///
/// Fails if a recorder is already installed for this process.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "change_orders_total",
        "Change order generation attempts by source and outcome"
    );
    describe_histogram!(
        "llm_request_duration_seconds",
        "Duration of LLM parsing requests in seconds"
    );
    describe_counter!(
        "llm_retries_total",
        "LLM requests retried after a transient failure"
    );
    describe_counter!("uploads_total", "Workbook uploads by backend and outcome");
    describe_gauge!(
        "change_order_generator_info",
        "Service version information"
    );

    gauge!("change_order_generator_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one generation attempt; `source` is `pdf`, `text` or `cli`
pub fn record_change_order(source: &str, outcome: &str) {
    counter!(
        "change_orders_total",
        "source" => source.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

pub fn record_llm_duration(model: &str, outcome: &str, duration: Duration) {
    histogram!(
        "llm_request_duration_seconds",
        "model" => model.to_string(),
        "outcome" => outcome.to_string(),
    )
    .record(duration.as_secs_f64());
}

pub fn record_llm_retry(attempt: u32) {
    counter!("llm_retries_total", "attempt" => attempt.to_string()).increment(1);
}

pub fn record_upload(backend: &str, outcome: &str) {
    counter!(
        "uploads_total",
        "backend" => backend.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}
