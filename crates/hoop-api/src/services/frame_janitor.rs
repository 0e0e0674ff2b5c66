//! Background service evicting old frame directories.
//!
//! Frame directories have to outlive the response that created them, since
//! the browser fetches the thumbnails afterwards. This service deletes them
//! once they are older than the configured retention.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::config::ApiConfig;
use crate::metrics;

/// Longest pause between sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Time a rendered results page gets to load its thumbnails.
const VIEW_WINDOW: Duration = Duration::from_secs(60);

/// Frame directory janitor.
pub struct FrameJanitor {
    frames_root: PathBuf,
    retention: Duration,
}

impl FrameJanitor {
    /// Create a janitor for the configured frames root.
    ///
    /// A non-zero retention is raised to at least the extraction timeout plus
    /// [`VIEW_WINDOW`], so a directory is never evicted while ffmpeg may still
    /// be writing to it or right after its page was rendered.
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            frames_root: config.frames_root(),
            retention: effective_retention(config.frame_retention, config.extraction_timeout),
        }
    }

    /// Whether eviction is turned on. A zero retention disables it.
    pub fn is_enabled(&self) -> bool {
        !self.retention.is_zero()
    }

    /// Sweep at a fraction of the retention, capped at one minute.
    fn sweep_interval(&self) -> Duration {
        (self.retention / 4).clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL)
    }

    /// Start the background eviction loop.
    ///
    /// This function runs indefinitely and should be spawned as a background task.
    pub async fn run(&self) {
        if !self.is_enabled() {
            info!("Frame directory eviction is disabled");
            return;
        }

        let every = self.sweep_interval();
        info!(
            root = %self.frames_root.display(),
            retention_secs = self.retention.as_secs(),
            "Starting frame janitor (interval: {:?})", every
        );

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = self.sweep_once().await {
                error!("Frame directory sweep error: {}", e);
            }
        }
    }

    /// Run a single sweep. Returns the number of directories removed.
    pub async fn sweep_once(&self) -> anyhow::Result<usize> {
        let removed = hoop_media::sweep_expired(&self.frames_root, self.retention).await?;
        if removed > 0 {
            info!(removed, "Evicted expired frame directories");
            metrics::record_frame_dirs_evicted(removed);
        }
        Ok(removed)
    }
}

fn effective_retention(configured: Duration, extraction_timeout: Duration) -> Duration {
    if configured.is_zero() {
        return configured;
    }

    let floor = extraction_timeout + VIEW_WINDOW;
    if configured < floor {
        warn!(
            configured_secs = configured.as_secs(),
            effective_secs = floor.as_secs(),
            "FRAME_RETENTION_SECS is shorter than EXTRACTION_TIMEOUT_SECS plus the view window; raising it"
        );
        return floor;
    }
    configured
}
