//! Application state.

use std::sync::Arc;

use tokio::sync::Semaphore;

use hoop_media::{FfmpegFrameExtractor, FfmpegRunner, FrameExtractor};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub extractor: Arc<dyn FrameExtractor>,
    /// Permits for concurrently running extractions
    pub extraction_slots: Arc<Semaphore>,
}

impl AppState {
    /// Create state with the ffmpeg-backed extractor.
    pub fn new(config: ApiConfig) -> Self {
        let runner = FfmpegRunner::new()
            .with_binary(config.ffmpeg_path.clone())
            .with_timeout(config.extraction_timeout.as_secs().max(1));
        let extractor = FfmpegFrameExtractor::new(runner)
            .with_fps(config.frames_per_second)
            .with_quality(config.jpeg_quality);

        Self::with_extractor(config, Arc::new(extractor))
    }

    /// Create state with a custom extractor.
    pub fn with_extractor(config: ApiConfig, extractor: Arc<dyn FrameExtractor>) -> Self {
        let extraction_slots = Arc::new(Semaphore::new(config.max_concurrent_extractions.max(1)));
        Self {
            config,
            extractor,
            extraction_slots,
        }
    }

    /// Create the upload and frame directories.
    pub async fn prepare_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.config.uploads_dir()).await?;
        tokio::fs::create_dir_all(self.config.frames_root()).await
    }
}
