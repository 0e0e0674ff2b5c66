//! FFmpeg CLI wrapper for frame extraction.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Timeouts, with the child killed on expiry or drop
//! - Time-stamped frame directories, frame listing and eviction

pub mod command;
pub mod error;
pub mod frames;
pub mod progress;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{
    frame_index, list_frames, sweep_expired, FfmpegFrameExtractor, FrameDirectory,
    FrameExtractor, FRAME_DIR_PREFIX, FRAME_FILE_PATTERN,
};
pub use progress::FfmpegProgress;
