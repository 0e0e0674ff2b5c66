//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::services::ServeDir;

use crate::handlers::{analyze, health, index, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    upload_size_limit, RateLimiterCache,
};
use crate::state::AppState;

/// Create the application router.
///
/// Anything not matched by a route is looked up under the frames root, so
/// `/<frame_dir>/<frame_file>` resolves and nothing outside it is reachable.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let rate_limiter = Arc::new(RateLimiterCache::new(
        state.config.analyze_rate_limit_rps,
        state.config.trust_proxy_headers,
    ));
    let max_upload_bytes = state.config.max_upload_bytes;

    // Uploads get their own size limit instead of axum's 2MB default
    let analyze_routes = Router::new()
        .route("/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            max_upload_bytes,
            upload_size_limit,
        ))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    let frames = ServeDir::new(state.config.frames_root());

    Router::new()
        .route("/", get(index))
        .merge(analyze_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .fallback_service(frames)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
