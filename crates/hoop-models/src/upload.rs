//! Upload metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What the client told us about an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadMeta {
    /// Filename as sent by the browser
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    /// Declared media type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Bytes written to disk
    pub size_bytes: u64,
}

impl UploadMeta {
    /// Name to show to the user.
    pub fn display_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or("upload")
    }
}

/// Check for a `video/*` media type, ignoring case and parameters.
///
/// `application/octet-stream` also passes: browsers send it for containers
/// they have no mapping for, e.g. `.mkv` on some platforms.
pub fn is_video_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("video/") || essence == "application/octet-stream"
}
