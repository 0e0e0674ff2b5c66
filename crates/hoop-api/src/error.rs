//! API error types.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use hoop_media::MediaError;

use crate::config::is_production_environment;
use crate::render;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Media(e) => match e {
                MediaError::NoFramesExtracted(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MediaError::FfmpegFailed { .. } => StatusCode::BAD_GATEWAY,
                MediaError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                MediaError::FfmpegNotFound(_) => StatusCode::SERVICE_UNAVAILABLE,
                MediaError::FileNotFound(_)
                | MediaError::DirectoryExhausted(_)
                | MediaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user.
    fn user_message(&self) -> String {
        match self {
            ApiError::Media(MediaError::NoFramesExtracted(_)) => {
                "No frames could be extracted. Is the clip empty or corrupt?".to_string()
            }
            ApiError::Media(MediaError::FfmpegFailed { .. }) => {
                "The video could not be decoded.".to_string()
            }
            ApiError::Media(MediaError::Timeout(secs)) => {
                format!("Frame extraction took longer than {} seconds.", secs)
            }
            ApiError::Media(MediaError::FfmpegNotFound(_)) => {
                "Video processing is unavailable right now.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(e.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            match &self {
                ApiError::Media(MediaError::FfmpegFailed { stderr, exit_code, .. }) => error!(
                    exit_code = ?exit_code,
                    stderr = stderr.as_deref().unwrap_or(""),
                    "Request failed: {}", self
                ),
                _ => error!("Request failed: {}", self),
            }
        } else {
            warn!(status = %status, "Request rejected: {}", self);
        }

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_) | ApiError::Io(_) => {
                let environment = std::env::var("ENVIRONMENT").unwrap_or_default();
                if is_production_environment(&environment) {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.user_message(),
        };

        (status, Html(render::error_page(status, &detail))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::bad_request("missing").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MediaError::NoFramesExtracted(PathBuf::from("x"))).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(MediaError::ffmpeg_failed("boom", None, Some(1))).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(MediaError::Timeout(5)).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(MediaError::FfmpegNotFound("ffmpeg".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_response_is_html() {
        let response = ApiError::PayloadTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}
