//! Shared data models for Hoop Vision.
//!
//! This crate provides Serde-serializable types for:
//! - Simulated game statistics
//! - The fixed highlight list
//! - Upload metadata and the analysis report handed to the renderer

pub mod analysis;
pub mod highlight;
pub mod stats;
pub mod upload;

// Re-export common types
pub use analysis::{AnalysisReport, MAX_RENDERED_FRAMES};
pub use highlight::{static_highlights, Highlight, HighlightKind};
pub use stats::GameStats;
pub use upload::UploadMeta;
