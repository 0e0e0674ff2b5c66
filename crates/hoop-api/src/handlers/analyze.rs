//! Analysis handler: upload, extract frames, render results.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::response::Html;
use tracing::{info, warn};

use hoop_media::{FrameDirectory, MediaError};
use hoop_models::AnalysisReport;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::render;
use crate::state::AppState;
use crate::upload::receive_video;

/// `POST /analyze`: run one clip through the pipeline.
///
/// The upload is deleted when this returns. The frame directory is kept so
/// the browser can fetch the thumbnails; it is removed right away only when
/// extraction fails.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Html<String>> {
    let upload = receive_video(multipart, &state.config.uploads_dir()).await?;
    metrics::record_upload_bytes(upload.meta().size_bytes);
    info!(
        size_bytes = upload.meta().size_bytes,
        original_name = upload.meta().display_name(),
        "Received upload"
    );

    let _permit = {
        metrics::adjust_extractions_waiting(1.0);
        let _waiting = scopeguard::guard((), |_| metrics::adjust_extractions_waiting(-1.0));
        state
            .extraction_slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ApiError::internal("Extraction pool closed"))?
    };

    let frame_dir = FrameDirectory::create(state.config.frames_root()).await?;
    let start = Instant::now();

    if let Err(e) = state.extractor.extract(upload.path(), &frame_dir).await {
        metrics::record_extraction_failure(failure_kind(&e));
        if let Err(rm) = tokio::fs::remove_dir_all(frame_dir.path()).await {
            warn!(dir = %frame_dir.name(), "Failed to remove frame directory: {}", rm);
        }
        return Err(e.into());
    }
    drop(_permit);

    let frames = frame_dir.frames().await?;
    metrics::record_extraction(frames.len(), start.elapsed().as_secs_f64());

    let total_frames = frames.len();
    let report = AnalysisReport::new(frame_dir.name(), frames, total_frames, upload.meta().clone());

    info!(
        frame_dir = %report.frame_dir,
        total_frames = report.total_frames,
        duration_ms = start.elapsed().as_millis() as u64,
        "Analysis complete"
    );

    Ok(Html(render::results_page(&report)))
}

fn failure_kind(e: &MediaError) -> &'static str {
    match e {
        MediaError::FfmpegNotFound(_) => "ffmpeg_not_found",
        MediaError::FfmpegFailed { .. } => "ffmpeg_failed",
        MediaError::Timeout(_) => "timeout",
        MediaError::NoFramesExtracted(_) => "no_frames",
        MediaError::FileNotFound(_) | MediaError::DirectoryExhausted(_) | MediaError::Io(_) => "io",
    }
}
