//! osu!standard score records read from JSON files

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use osu_score_core::{
    Beatmap, BeatmapScore, EstimationProviders, GameMod, OsuHitcounts, RawMod, Rank, Ruleset,
    ScoreInfo,
};
use serde::Deserialize;

/// Judgement counts as named by the osu! API
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsuStatistics {
    pub great: u32,
    pub ok: u32,
    pub meh: u32,
    pub miss: u32,
}

impl OsuStatistics {
    fn total(&self) -> u64 {
        [self.great, self.ok, self.meh, self.miss]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    /// Weighted accuracy in percent (300 = 6, 100 = 2, 50 = 1)
    fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted = 6 * u64::from(self.great) + 2 * u64::from(self.ok) + u64::from(self.meh);
        weighted as f64 / (6 * total) as f64 * 100.0
    }

    /// Rank the osu! client would award for a passed play
    fn rank(&self, silver: bool) -> Rank {
        let total = self.total() as f64;
        if total == 0.0 {
            return Rank::D;
        }
        let ratio300 = f64::from(self.great) / total;
        let ratio50 = f64::from(self.meh) / total;
        let no_miss = self.miss == 0;

        if ratio300 >= 1.0 {
            if silver {
                Rank::SilverSS
            } else {
                Rank::SS
            }
        } else if ratio300 > 0.9 && ratio50 <= 0.01 && no_miss {
            if silver {
                Rank::SilverS
            } else {
                Rank::S
            }
        } else if (ratio300 > 0.8 && no_miss) || ratio300 > 0.9 {
            Rank::A
        } else if (ratio300 > 0.7 && no_miss) || ratio300 > 0.8 {
            Rank::B
        } else if ratio300 > 0.6 {
            Rank::C
        } else {
            Rank::D
        }
    }
}

fn default_map_progress() -> f64 {
    1.0
}

fn default_passed() -> bool {
    true
}

/// A play on an osu!standard beatmap
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreFile {
    pub beatmap: Beatmap,
    #[serde(default)]
    pub mods: Vec<RawMod>,
    pub statistics: OsuStatistics,
    /// Percent; derived from the statistics when absent
    #[serde(default)]
    pub accuracy: Option<f64>,
    pub max_combo: u32,
    #[serde(default = "default_map_progress")]
    pub map_progress: f64,
    #[serde(default = "default_passed")]
    pub passed: bool,
    #[serde(default)]
    pub total_score: u64,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub pp: Option<f64>,
    #[serde(default)]
    pub score_id: Option<u64>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl ScoreFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read score file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid score file {}", path.display()))
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let file: ScoreFile = serde_json::from_str(json)?;
        if file.beatmap.ruleset != Ruleset::Osu {
            anyhow::bail!(
                "only osu!standard scores can be estimated, got {}",
                file.beatmap.ruleset
            );
        }
        Ok(file)
    }

    /// Bind the play to its beatmap with the given estimation providers
    pub fn into_score(
        self,
        providers: EstimationProviders<OsuHitcounts>,
    ) -> osu_score_core::Result<BeatmapScore<OsuHitcounts>> {
        let mods = self
            .mods
            .iter()
            .map(|raw| GameMod::from_raw(Ruleset::Osu, raw))
            .collect::<osu_score_core::Result<Vec<_>>>()?;

        let stats = self.statistics;
        let accuracy = self.accuracy.unwrap_or_else(|| stats.accuracy());
        let rank = self.rank.unwrap_or_else(|| {
            if !self.passed {
                return Rank::F;
            }
            let silver = mods.iter().any(|m| matches!(m.acronym(), "HD" | "FL"));
            stats.rank(silver)
        });

        let info = ScoreInfo {
            score_id: self.score_id,
            ended_at: self.ended_at.unwrap_or_else(Utc::now),
            passed: self.passed,
            map_progress: self.map_progress,
            mods,
            total_score: self.total_score,
            max_combo: self.max_combo,
            hitcounts: OsuHitcounts::new(stats.great, stats.ok, stats.meh, stats.miss),
            accuracy,
            rank,
            pp: self.pp,
        };

        BeatmapScore::new(info, self.beatmap, providers)
    }
}
