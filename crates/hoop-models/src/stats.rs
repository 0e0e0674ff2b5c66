//! Simulated game statistics.
//!
//! Nothing here looks at the video. Every field is an independent uniform
//! draw from a fixed half-open range.

use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Exclusive upper bound for points.
pub const POINTS_MAX: u32 = 80;
/// Exclusive upper bound for rebounds.
pub const REBOUNDS_MAX: u32 = 30;
/// Exclusive upper bound for assists.
pub const ASSISTS_MAX: u32 = 20;
/// Exclusive upper bound for turnovers.
pub const TURNOVERS_MAX: u32 = 15;
/// Exclusive upper bound for three-pointers made.
pub const THREES_MADE_MAX: u32 = 20;

/// Box-score style statistics for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub turnovers: u32,
    pub threes_made: u32,
}

impl GameStats {
    /// Draw a fresh record from the thread-local generator.
    pub fn simulate() -> Self {
        Self::simulate_with(&mut rand::rng())
    }

    /// Draw a fresh record from the given generator.
    pub fn simulate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            points: rng.random_range(0..POINTS_MAX),
            rebounds: rng.random_range(0..REBOUNDS_MAX),
            assists: rng.random_range(0..ASSISTS_MAX),
            turnovers: rng.random_range(0..TURNOVERS_MAX),
            threes_made: rng.random_range(0..THREES_MADE_MAX),
        }
    }

    /// Check every field against its range.
    pub fn is_within_bounds(&self) -> bool {
        self.points < POINTS_MAX
            && self.rebounds < REBOUNDS_MAX
            && self.assists < ASSISTS_MAX
            && self.turnovers < TURNOVERS_MAX
            && self.threes_made < THREES_MADE_MAX
    }

    /// Labelled rows in display order.
    pub fn rows(&self) -> [(&'static str, u32); 5] {
        [
            ("Points", self.points),
            ("Rebounds", self.rebounds),
            ("Assists", self.assists),
            ("Turnovers", self.turnovers),
            ("3-Pointers Made", self.threes_made),
        ]
    }
}
