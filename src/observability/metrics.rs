//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): inbound requests by service, method, route, status
//! - `http_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_requests_total` (counter): data service calls by endpoint and outcome
//! - `gateway_upstream_retries_total` (counter): replayed data service calls
//! - `db_pool_available` (gauge): free pool slots seen by the last readiness probe
//!
//! # Design Decisions
//! - One Prometheus recorder per process, installed lazily on first use
//! - Every service renders the same registry from its own `/metrics` route

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the Prometheus recorder if it is not installed yet.
///
/// Returns `None` when another recorder already owns the global slot.
pub fn init_metrics() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe_metrics();
                Some(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        })
        .clone()
}

fn describe_metrics() {
    describe_counter!("http_requests_total", "Total inbound HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "Inbound HTTP request latency in seconds"
    );
    describe_counter!(
        "gateway_upstream_requests_total",
        "Calls from the gateway to the data service, by outcome"
    );
    describe_counter!(
        "gateway_upstream_retries_total",
        "Data service calls replayed by the retry policy"
    );
    describe_gauge!(
        "db_pool_available",
        "Free connection slots observed by the last readiness probe"
    );
}

/// Record one finished inbound request.
pub fn record_request(service: &'static str, method: &str, path: &str, status: u16, start: Instant) {
    histogram!(
        "http_request_duration_seconds",
        "service" => service,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(start.elapsed().as_secs_f64());

    counter!(
        "http_requests_total",
        "service" => service,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the final outcome of a gateway call to the data service.
pub fn record_upstream(endpoint: &str, outcome: &'static str) {
    counter!(
        "gateway_upstream_requests_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one retry of a gateway call.
pub fn record_retry(endpoint: &str) {
    counter!("gateway_upstream_retries_total", "endpoint" => endpoint.to_string()).increment(1);
}

/// Record the pool headroom reported by a readiness probe.
pub fn record_pool_available(available: u32) {
    gauge!("db_pool_available").set(f64::from(available));
}

/// Middleware recording count and latency for every request, labelled by route template.
pub async fn track_requests(
    State(service): State<&'static str>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(service, &method, &path, response.status().as_u16(), start);
    response
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics_handler() -> Response {
    match init_metrics() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder unavailable").into_response(),
    }
}
