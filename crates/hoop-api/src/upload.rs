//! Multipart upload receiver.

use std::path::Path;

use axum::extract::Multipart;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use hoop_models::upload::is_video_media_type;
use hoop_models::UploadMeta;

use crate::error::{ApiError, ApiResult};

/// Form field carrying the video.
pub const VIDEO_FIELD: &str = "video";

/// A received video on local disk. The file is removed when this is dropped.
#[derive(Debug)]
pub struct Upload {
    path: TempPath,
    meta: UploadMeta,
}

impl Upload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta(&self) -> &UploadMeta {
        &self.meta
    }
}

/// Stream the `video` field of a multipart body into `uploads_dir`.
///
/// The stored file gets a generated name; the client's extension is dropped.
/// Fields other than `video` are skipped.
pub async fn receive_video(mut multipart: Multipart, uploads_dir: &Path) -> ApiResult<Upload> {
    tokio::fs::create_dir_all(uploads_dir).await?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        if let Some(ct) = content_type.as_deref() {
            if !is_video_media_type(ct) {
                return Err(ApiError::UnsupportedMediaType(ct.to_string()));
            }
        }

        let (file, path) = tempfile::Builder::new()
            .prefix("upload_")
            .tempfile_in(uploads_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut size_bytes = 0u64;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            size_bytes += chunk.len() as u64;
        }
        file.flush().await?;

        if size_bytes == 0 {
            return Err(ApiError::bad_request("The uploaded video is empty"));
        }

        debug!(
            path = %path.display(),
            size_bytes,
            original_name = original_name.as_deref().unwrap_or(""),
            "Stored upload"
        );

        return Ok(Upload {
            path,
            meta: UploadMeta {
                original_name,
                content_type,
                size_bytes,
            },
        });
    }

    Err(ApiError::bad_request("Missing `video` file field"))
}
