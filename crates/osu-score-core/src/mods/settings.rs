//! Mod settings bundles
//!
//! Every field is optional and falls back to a documented default when absent,
//! except the target practice seed which must always be present.

use serde::{Deserialize, Serialize};

/// Default speed change of half time and daycore
pub const HALF_TIME_DEFAULT_SPEED: f64 = 0.75;
/// Default speed change of double time and nightcore
pub const DOUBLE_TIME_DEFAULT_SPEED: f64 = 1.5;

/// Settings of the rate-changing mods (HT, DC, DT, NC)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateAdjust {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjust_pitch: Option<bool>,
}

impl RateAdjust {
    pub fn with_speed(speed_change: f64) -> Self {
        Self {
            speed_change: Some(speed_change),
            adjust_pitch: None,
        }
    }

    /// Effective speed change given the mod's default
    pub fn speed_or(&self, default: f64) -> f64 {
        self.speed_change.unwrap_or(default)
    }

    /// Whether every setting matches the mod's defaults
    pub fn is_default(&self, default_speed: f64) -> bool {
        self.speed_or(default_speed) == default_speed && !self.adjust_pitch.unwrap_or(false)
    }
}

/// Settings of difficulty adjust: any subset of AR/CS/OD/HP
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyAdjustSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approach_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_difficulty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drain_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_limits: Option<bool>,
}

impl DifficultyAdjustSettings {
    /// Whether no stat is overridden
    pub fn is_default(&self) -> bool {
        self.approach_rate.is_none()
            && self.circle_size.is_none()
            && self.overall_difficulty.is_none()
            && self.drain_rate.is_none()
            && !self.extended_limits.unwrap_or(false)
    }

    pub(crate) fn values(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("approach_rate", self.approach_rate),
            ("circle_size", self.circle_size),
            ("overall_difficulty", self.overall_difficulty),
            ("drain_rate", self.drain_rate),
        ]
    }
}

/// Settings of target practice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPracticeSettings {
    /// Seed of the generated object layout; required
    pub seed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metronome: Option<bool>,
}

impl TargetPracticeSettings {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            metronome: None,
        }
    }
}
