//! Beatmap data structures and types

mod metadata;

pub use metadata::*;

use serde::{Deserialize, Serialize};

use crate::ruleset::Ruleset;

/// The four difficulty settings of a beatmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatmapStats {
    /// Approach rate
    pub ar: f64,
    /// Circle size
    pub cs: f64,
    /// Overall difficulty
    pub od: f64,
    /// Health drain
    pub hp: f64,
}

impl BeatmapStats {
    pub fn new(ar: f64, cs: f64, od: f64, hp: f64) -> Self {
        Self { ar, cs, od, hp }
    }
}

/// A single playable difficulty.
///
/// Beatmaps are never mutated; derive modified versions through [`Beatmap::copy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    /// Online beatmap ID
    pub id: u32,
    pub ruleset: Ruleset,
    /// Difficulty name/version
    #[serde(default)]
    pub difficulty_name: String,
    pub stats: BeatmapStats,
    /// Star rating, `None` when it is unknown and must be estimated
    pub star_rating: Option<f64>,
    /// Drain length in seconds
    pub length_seconds: f64,
    /// Maximum achievable combo, if known
    pub max_combo: Option<u32>,
    #[serde(default)]
    pub beatmapset: Beatmapset,
    #[serde(default)]
    pub song: Song,
}

impl Beatmap {
    /// Create a new beatmap with the given overrides applied on top of `self`.
    ///
    /// Every field not present in `overrides` is cloned from `self`.
    pub fn copy(&self, overrides: BeatmapOverrides) -> Beatmap {
        Beatmap {
            id: overrides.id.unwrap_or(self.id),
            ruleset: overrides.ruleset.unwrap_or(self.ruleset),
            difficulty_name: overrides
                .difficulty_name
                .unwrap_or_else(|| self.difficulty_name.clone()),
            stats: overrides.stats.unwrap_or(self.stats),
            star_rating: overrides.star_rating.unwrap_or(self.star_rating),
            length_seconds: overrides.length_seconds.unwrap_or(self.length_seconds),
            max_combo: overrides.max_combo.unwrap_or(self.max_combo),
            beatmapset: overrides
                .beatmapset
                .unwrap_or_else(|| self.beatmapset.clone()),
            song: overrides.song.unwrap_or_else(|| self.song.clone()),
        }
    }

    /// Whether the star rating is known without estimation
    pub fn has_known_star_rating(&self) -> bool {
        self.star_rating.is_some_and(f64::is_finite)
    }
}

/// Field overrides for [`Beatmap::copy`].
///
/// Nullable fields use a nested `Option`: the outer level tells whether the
/// field is overridden at all, the inner one is the new (possibly absent) value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatmapOverrides {
    pub id: Option<u32>,
    pub ruleset: Option<Ruleset>,
    pub difficulty_name: Option<String>,
    pub stats: Option<BeatmapStats>,
    pub star_rating: Option<Option<f64>>,
    pub length_seconds: Option<f64>,
    pub max_combo: Option<Option<u32>>,
    pub beatmapset: Option<Beatmapset>,
    pub song: Option<Song>,
}

impl BeatmapOverrides {
    /// Create overrides that change nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no field is overridden
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = Some(ruleset);
        self
    }

    pub fn with_difficulty_name(mut self, name: impl Into<String>) -> Self {
        self.difficulty_name = Some(name.into());
        self
    }

    pub fn with_stats(mut self, stats: BeatmapStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Override the star rating; `None` marks it as unknown
    pub fn with_star_rating(mut self, star_rating: Option<f64>) -> Self {
        self.star_rating = Some(star_rating);
        self
    }

    pub fn with_length_seconds(mut self, length_seconds: f64) -> Self {
        self.length_seconds = Some(length_seconds);
        self
    }

    /// Override the max combo; `None` explicitly clears it
    pub fn with_max_combo(mut self, max_combo: Option<u32>) -> Self {
        self.max_combo = Some(max_combo);
        self
    }

    pub fn with_beatmapset(mut self, beatmapset: Beatmapset) -> Self {
        self.beatmapset = Some(beatmapset);
        self
    }

    pub fn with_song(mut self, song: Song) -> Self {
        self.song = Some(song);
        self
    }
}
