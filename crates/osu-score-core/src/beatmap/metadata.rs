//! Beatmapset and song metadata

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ranked status of a beatmapset (matches osu! API values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankedStatus {
    Graveyard = -2,
    Wip = -1,
    #[default]
    Pending = 0,
    Ranked = 1,
    Approved = 2,
    Qualified = 3,
    Loved = 4,
}

impl RankedStatus {
    /// Whether scores on this status award pp
    pub fn awards_pp(&self) -> bool {
        matches!(self, Self::Ranked | Self::Approved)
    }

    /// Whether the beatmapset has a leaderboard
    pub fn has_leaderboard(&self) -> bool {
        matches!(
            self,
            Self::Ranked | Self::Approved | Self::Qualified | Self::Loved
        )
    }
}

impl fmt::Display for RankedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankedStatus::Graveyard => write!(f, "Graveyard"),
            RankedStatus::Wip => write!(f, "WIP"),
            RankedStatus::Pending => write!(f, "Pending"),
            RankedStatus::Ranked => write!(f, "Ranked"),
            RankedStatus::Approved => write!(f, "Approved"),
            RankedStatus::Qualified => write!(f, "Qualified"),
            RankedStatus::Loved => write!(f, "Loved"),
        }
    }
}

/// The beatmapset a difficulty belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beatmapset {
    /// Online beatmapset ID
    pub id: u32,
    /// Beatmapset creator username
    pub creator: String,
    pub status: RankedStatus,
}

/// The song a beatmapset is mapped to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub artist: String,
    pub title: String,
    /// Main BPM
    pub bpm: f64,
    /// Song length in seconds
    pub length_seconds: f64,
}

impl Song {
    /// "Artist - Title"
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}
