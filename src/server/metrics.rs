use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all service metrics
const PREFIX: &str = "nutrition";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "route", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "route"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Dataset Metrics
    pub static ref DATASET_LOADS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_dataset_loads_total"), "Dataset loads by source and outcome"),
        &["source", "outcome"]
    ).expect("Failed to create dataset_loads_total metric");

    pub static ref DATASET_LOAD_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_dataset_load_duration_seconds"),
            "Time spent loading and parsing the dataset"
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        &["source"]
    ).expect("Failed to create dataset_load_duration_seconds metric");

    pub static ref DATASET_ROWS: Gauge = Gauge::new(
        format!("{PREFIX}_dataset_rows"),
        "Number of records in the last successfully loaded dataset"
    ).expect("Failed to create dataset_rows metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DATASET_LOADS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DATASET_LOAD_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DATASET_ROWS.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// `route` is the matched route template, never the raw request path.
pub fn record_http_request(method: &str, route: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, route, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, route])
        .observe(duration.as_secs_f64());
}

/// Record a dataset load. `outcome` is "success" or a `DatasetError::kind`.
pub fn record_dataset_load(source: &str, outcome: &str, rows: Option<usize>, duration: Duration) {
    DATASET_LOADS_TOTAL
        .with_label_values(&[source, outcome])
        .inc();
    DATASET_LOAD_DURATION_SECONDS
        .with_label_values(&[source])
        .observe(duration.as_secs_f64());
    if let Some(rows) = rows {
        DATASET_ROWS.set(rows as f64);
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
