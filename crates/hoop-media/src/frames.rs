//! Frame extraction into time-stamped directories.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Prefix of every frame directory name.
pub const FRAME_DIR_PREFIX: &str = "frames_";

/// Output pattern handed to ffmpeg inside a frame directory.
pub const FRAME_FILE_PATTERN: &str = "frame_%04d.jpg";

const FRAME_FILE_PREFIX: &str = "frame_";
const FRAME_FILE_EXT: &str = ".jpg";

/// Suffixed names tried after a millisecond collision.
const MAX_NAME_ATTEMPTS: u32 = 64;

/// A per-request directory of extracted stills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDirectory {
    name: String,
    path: PathBuf,
}

impl FrameDirectory {
    /// Create a fresh `frames_<unix-millis>` directory under `root`.
    ///
    /// Never reuses an existing directory: on collision a `_<n>` suffix is
    /// appended.
    pub async fn create(root: impl AsRef<Path>) -> MediaResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).await?;

        let millis = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}{}", FRAME_DIR_PREFIX, millis)
            } else {
                format!("{}{}_{}", FRAME_DIR_PREFIX, millis, attempt)
            };
            let path = root.join(&name);

            match fs::create_dir(&path).await {
                Ok(()) => {
                    debug!(dir = %path.display(), "Created frame directory");
                    return Ok(Self { name, path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(MediaError::DirectoryExhausted(root.to_path_buf()))
    }

    /// Directory name, relative to the frames root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frame file names, ordered by frame index.
    pub async fn frames(&self) -> MediaResult<Vec<String>> {
        list_frames(&self.path).await
    }
}

/// Turns a video file into a sequence of stills.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Write frames into `dir` and return how many were written.
    async fn extract(&self, input: &Path, dir: &FrameDirectory) -> MediaResult<usize>;
}

/// [`FrameExtractor`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    runner: FfmpegRunner,
    fps: u32,
    quality: u8,
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new(FfmpegRunner::new())
    }
}

impl FfmpegFrameExtractor {
    /// One frame per second at high JPEG quality.
    pub fn new(runner: FfmpegRunner) -> Self {
        Self {
            runner,
            fps: 1,
            quality: 2,
        }
    }

    /// Frames sampled per second of video.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// JPEG quality, 2 (best) to 31.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    fn command(&self, input: &Path, dir: &FrameDirectory) -> FfmpegCommand {
        FfmpegCommand::new(input, dir.path().join(FRAME_FILE_PATTERN))
            .sample_rate(self.fps)
            .jpeg_quality(self.quality)
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract(&self, input: &Path, dir: &FrameDirectory) -> MediaResult<usize> {
        if !fs::try_exists(input).await.unwrap_or(false) {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let dir_name = dir.name().to_string();
        let progress = self
            .runner
            .run_with_progress(&self.command(input, dir), move |p| {
                debug!(dir = %dir_name, frame = p.frame, speed = p.speed, "Extraction progress");
            })
            .await?;

        let count = dir.frames().await?.len();
        if count == 0 {
            warn!(input = %input.display(), "FFmpeg produced no frames");
            return Err(MediaError::NoFramesExtracted(input.to_path_buf()));
        }

        info!(
            dir = %dir.name(),
            frames = count,
            out_time_ms = progress.out_time_ms,
            "Frame extraction complete"
        );
        Ok(count)
    }
}

/// Parse the 1-based index out of a `frame_NNNN.jpg` file name.
pub fn frame_index(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(FRAME_FILE_PREFIX)?
        .strip_suffix(FRAME_FILE_EXT)?
        .parse()
        .ok()
}

/// List frame files in `dir`, ordered by frame index. Other entries are skipped.
pub async fn list_frames(dir: impl AsRef<Path>) -> MediaResult<Vec<String>> {
    let mut entries = fs::read_dir(dir.as_ref()).await?;
    let mut frames = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if let Some(index) = frame_index(name) {
                frames.push((index, name.to_string()));
            }
        }
    }

    frames.sort_unstable();
    Ok(frames.into_iter().map(|(_, name)| name).collect())
}

/// Remove frame directories under `root` older than `max_age`.
///
/// Returns the number of directories removed. A missing root is not an error.
pub async fn sweep_expired(root: impl AsRef<Path>, max_age: Duration) -> MediaResult<usize> {
    let root = root.as_ref();
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let is_frame_dir = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with(FRAME_DIR_PREFIX));
        if !is_frame_dir {
            continue;
        }

        let metadata = entry.metadata().await?;
        if !metadata.is_dir() {
            continue;
        }

        // A modification time in the future counts as fresh
        let expired = metadata
            .modified()?
            .elapsed()
            .map(|age| age >= max_age)
            .unwrap_or(false);
        if !expired {
            continue;
        }

        match fs::remove_dir_all(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(dir = %entry.path().display(), "Failed to evict frame directory: {}", e),
        }
    }

    Ok(removed)
}
