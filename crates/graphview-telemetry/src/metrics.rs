//! Prometheus metrics for graphview.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `graphview_pipeline_runs_total` | Counter | `endpoint`, `outcome` | Completed pipeline runs |
//! | `graphview_pipeline_duration_seconds` | Histogram | `endpoint` | Pipeline latency |
//! | `graphview_hydration_fetches_total` | Counter | `kind`, `outcome` | Batched dataplane fetches |
//! | `graphview_hydration_ids_total` | Counter | `kind` | Ids requested from the dataplane |
//! | `graphview_hydration_absent_total` | Counter | `kind` | Ids recorded as absent |
//!
//! Recording functions are cheap no-ops until a recorder is installed with
//! [`init_metrics`].

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{
    ExporterFuture, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address the metrics endpoint is served on (e.g., "0.0.0.0:9090").
    pub addr: String,

    /// Histogram buckets for pipeline duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: "0.0.0.0:9090".to_string(),
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder and serves it on `config.addr`.
///
/// Inside a tokio runtime the exporter runs as a task on it; otherwise it
/// gets a single-threaded runtime on its own thread.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::MetricsInit` if the listener or recorder cannot be set up.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(PIPELINE_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            let (recorder, exporter) = build_in(&runtime, builder)?;
            let handle = install_recorder(recorder)?;
            runtime.spawn(serve(exporter));
            handle
        }
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let (recorder, exporter) = build_in(runtime.handle(), builder)?;
            let handle = install_recorder(recorder)?;
            std::thread::Builder::new()
                .name("graphview-metrics".to_string())
                .spawn(move || runtime.block_on(serve(exporter)))
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            handle
        }
    };

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();
    tracing::info!(addr = %addr, "metrics exporter listening");

    Ok(())
}

// The listener binds to the runtime that is current while building.
fn build_in(
    runtime: &tokio::runtime::Handle,
    builder: PrometheusBuilder,
) -> TelemetryResult<(PrometheusRecorder, ExporterFuture)> {
    let _guard = runtime.enter();
    builder
        .build()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

fn install_recorder(recorder: PrometheusRecorder) -> TelemetryResult<PrometheusHandle> {
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    Ok(handle)
}

async fn serve(exporter: ExporterFuture) {
    if let Err(error) = exporter.await {
        tracing::error!(error = ?error, "metrics exporter stopped");
    }
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

const PIPELINE_RUNS: &str = "graphview_pipeline_runs_total";
const PIPELINE_DURATION: &str = "graphview_pipeline_duration_seconds";
const HYDRATION_FETCHES: &str = "graphview_hydration_fetches_total";
const HYDRATION_IDS: &str = "graphview_hydration_ids_total";
const HYDRATION_ABSENT: &str = "graphview_hydration_absent_total";

fn register_metric_descriptions() {
    describe_counter!(PIPELINE_RUNS, "Total pipeline runs by endpoint and outcome");
    describe_histogram!(PIPELINE_DURATION, "Pipeline run duration in seconds");
    describe_counter!(HYDRATION_FETCHES, "Total batched dataplane fetches by kind and outcome");
    describe_counter!(HYDRATION_IDS, "Total ids requested from the dataplane by kind");
    describe_counter!(HYDRATION_ABSENT, "Total ids hydrated as absent by kind");
}

/// Records a finished pipeline run.
///
/// `outcome` is `ok` or the error category of the failure.
pub fn record_pipeline_run(endpoint: &str, outcome: &str, duration: Duration) {
    counter!(
        PIPELINE_RUNS,
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(PIPELINE_DURATION, "endpoint" => endpoint.to_string())
        .record(duration.as_secs_f64());
}

/// Records one batched fetch and the number of ids it covered.
///
/// `outcome` is `ok` or the failure label of the dataplane error.
pub fn record_hydration_fetch(kind: &str, outcome: &str, ids: usize) {
    counter!(
        HYDRATION_FETCHES,
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    counter!(HYDRATION_IDS, "kind" => kind.to_string()).increment(ids as u64);
}

/// Records ids that hydrated as absent.
pub fn record_hydration_absent(kind: &str, count: usize) {
    if count == 0 {
        return;
    }
    counter!(HYDRATION_ABSENT, "kind" => kind.to_string()).increment(count as u64);
}
