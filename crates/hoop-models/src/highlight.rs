//! Highlight models.
//!
//! The highlight list is fixed: every analysis reports the same three moments
//! in the same order, whatever the uploaded clip contains.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of play a highlight describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    Dunk,
    ThreePointer,
    Block,
}

/// A described game moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Highlight {
    pub kind: HighlightKind,

    /// Human readable label, e.g. "Deep 3-pointer"
    pub label: String,

    /// Position in the clip (MM:SS)
    pub at: String,
}

impl Highlight {
    /// Create a new highlight.
    pub fn new(kind: HighlightKind, label: impl Into<String>, at: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            at: at.into(),
        }
    }
}

impl fmt::Display for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.label, self.at)
    }
}

/// The highlight list reported for every clip.
pub fn static_highlights() -> Vec<Highlight> {
    vec![
        Highlight::new(HighlightKind::Dunk, "Dunk", "00:23"),
        Highlight::new(HighlightKind::ThreePointer, "Deep 3-pointer", "01:15"),
        Highlight::new(HighlightKind::Block, "Chase-down block", "02:07"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_highlights_text() {
        let rendered: Vec<String> = static_highlights().iter().map(|h| h.to_string()).collect();
        assert_eq!(
            rendered,
            [
                "Dunk at 00:23",
                "Deep 3-pointer at 01:15",
                "Chase-down block at 02:07"
            ]
        );
    }
}
