//! Prometheus metrics for the API server.

use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Install the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "hoop_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "hoop_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "hoop_http_requests_in_flight";

    // Analysis metrics
    pub const UPLOAD_BYTES: &str = "hoop_upload_bytes";
    pub const EXTRACTION_DURATION_SECONDS: &str = "hoop_extraction_duration_seconds";
    pub const EXTRACTIONS_WAITING: &str = "hoop_extractions_waiting";
    pub const FRAMES_EXTRACTED_TOTAL: &str = "hoop_frames_extracted_total";
    pub const EXTRACTION_FAILURES_TOTAL: &str = "hoop_extraction_failures_total";
    pub const FRAME_DIRS_EVICTED_TOTAL: &str = "hoop_frame_dirs_evicted_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "hoop_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the size of a stored upload.
pub fn record_upload_bytes(bytes: u64) {
    histogram!(names::UPLOAD_BYTES).record(bytes as f64);
}

/// Track requests queued for an extraction slot.
pub fn adjust_extractions_waiting(delta: f64) {
    gauge!(names::EXTRACTIONS_WAITING).increment(delta);
}

/// Record a successful extraction.
pub fn record_extraction(frames: usize, duration_secs: f64) {
    histogram!(names::EXTRACTION_DURATION_SECONDS).record(duration_secs);
    counter!(names::FRAMES_EXTRACTED_TOTAL).increment(frames as u64);
}

/// Record a failed extraction.
pub fn record_extraction_failure(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::EXTRACTION_FAILURES_TOTAL, &labels).increment(1);
}

/// Record evicted frame directories.
pub fn record_frame_dirs_evicted(count: usize) {
    counter!(names::FRAME_DIRS_EVICTED_TOTAL).increment(count as u64);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels.
fn sanitize_path(path: &str) -> String {
    static FRAME_PATH: OnceLock<Regex> = OnceLock::new();
    let frame_path = FRAME_PATH.get_or_init(|| {
        Regex::new(r"^/frames_[0-9_]+(/[^/]*)?$").expect("static regex")
    });

    if frame_path.is_match(path) {
        return "/:frame_dir/:frame".to_string();
    }

    match path {
        "/" | "/analyze" | "/health" | "/healthz" | "/ready" | "/metrics" => path.to_string(),
        _ => "/:other".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
