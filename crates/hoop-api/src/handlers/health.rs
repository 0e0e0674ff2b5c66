//! Health check handlers.

use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub uploads_dir: CheckStatus,
    pub frames_root: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks that ffmpeg resolves and both data directories accept writes.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let ffmpeg_check = check_ffmpeg(state.config.ffmpeg_path.clone()).await;

    let uploads_check = check_writable(&state.config.uploads_dir()).await;
    let frames_check = check_writable(&state.config.frames_root()).await;

    let all_ok = ffmpeg_check.is_ok() && uploads_check.is_ok() && frames_check.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            ffmpeg: ffmpeg_check,
            uploads_dir: uploads_check,
            frames_root: frames_check,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Resolve the ffmpeg binary; the `PATH` lookup blocks, so run it off the runtime.
async fn check_ffmpeg(binary: PathBuf) -> CheckStatus {
    let start = Instant::now();

    match tokio::task::spawn_blocking(move || hoop_media::check_ffmpeg(binary)).await {
        Ok(Ok(_)) => CheckStatus::ok(start.elapsed().as_millis() as u64),
        Ok(Err(e)) => CheckStatus::error(e.to_string()),
        Err(e) => CheckStatus::error(e.to_string()),
    }
}

/// Probe a directory by creating and removing a scratch file in it.
async fn check_writable(dir: &Path) -> CheckStatus {
    let start = Instant::now();
    let dir = dir.to_path_buf();

    let result = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(".ready_")
            .tempfile_in(&dir)
            .map(drop)
    })
    .await;

    match result {
        Ok(Ok(())) => CheckStatus::ok(start.elapsed().as_millis() as u64),
        Ok(Err(e)) => CheckStatus::error(e.to_string()),
        Err(e) => CheckStatus::error(e.to_string()),
    }
}
