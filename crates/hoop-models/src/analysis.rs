//! Analysis report models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::highlight::{static_highlights, Highlight};
use crate::stats::GameStats;
use crate::upload::UploadMeta;

/// Most frame thumbnails shown on a results page.
pub const MAX_RENDERED_FRAMES: usize = 10;

/// Everything the results page is rendered from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Name of the frame directory, relative to the served frames root
    pub frame_dir: String,

    /// Frame file names inside `frame_dir`, at most [`MAX_RENDERED_FRAMES`]
    pub frames: Vec<String>,

    /// Number of frames ffmpeg wrote
    pub total_frames: usize,

    pub stats: GameStats,

    pub highlights: Vec<Highlight>,

    pub upload: UploadMeta,

    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Assemble a report with fresh stats and the fixed highlight list.
    ///
    /// `frames` is truncated to [`MAX_RENDERED_FRAMES`].
    pub fn new(
        frame_dir: impl Into<String>,
        mut frames: Vec<String>,
        total_frames: usize,
        upload: UploadMeta,
    ) -> Self {
        frames.truncate(MAX_RENDERED_FRAMES);
        Self {
            frame_dir: frame_dir.into(),
            frames,
            total_frames,
            stats: GameStats::simulate(),
            highlights: static_highlights(),
            upload,
            analyzed_at: Utc::now(),
        }
    }

    /// URL paths of the listed frames, resolvable by the static file route.
    pub fn frame_urls(&self) -> impl Iterator<Item = String> + '_ {
        self.frames
            .iter()
            .map(move |f| format!("/{}/{}", self.frame_dir, f))
    }
}
