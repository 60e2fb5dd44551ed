//! Gameplay mods and their effect on beatmap difficulty
//!
//! A [`GameMod`] is an immutable settings bundle bound to a ruleset. Applying
//! it to a [`Beatmap`] is a pure transform that produces a new beatmap.
//! [`apply_mods`] folds a list of mods in the ruleset's declared order.

mod conversion;
mod settings;

pub use conversion::*;
pub use settings::*;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::beatmap::{Beatmap, BeatmapOverrides, BeatmapStats, Song};
use crate::error::{Error, Result};
use crate::ruleset::Ruleset;

/// Upper bound for HR-boosted stats
const HARD_ROCK_CAP: f64 = 10.0;
const HARD_ROCK_CS_MULTIPLIER: f64 = 1.3;
const HARD_ROCK_MULTIPLIER: f64 = 1.4;
const EASY_MULTIPLIER: f64 = 0.5;

/// Case-insensitive mod code, stored uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Acronym(String);

impl Acronym {
    pub fn new(acronym: &str) -> Self {
        Self(acronym.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Acronym {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<Acronym> for String {
    fn from(value: Acronym) -> Self {
        value.0
    }
}

impl PartialEq<str> for Acronym {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Acronym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mod as delivered by the osu! API: acronym plus loosely typed settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMod {
    pub acronym: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

impl RawMod {
    pub fn new(acronym: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
            settings: Map::new(),
        }
    }

    /// Add a setting
    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(name.into(), value.into());
        self
    }
}

/// What a mod does, with its settings
#[derive(Debug, Clone, PartialEq)]
pub enum ModKind {
    Easy,
    HardRock,
    HalfTime(RateAdjust),
    Daycore(RateAdjust),
    DoubleTime(RateAdjust),
    Nightcore(RateAdjust),
    DifficultyAdjust(DifficultyAdjustSettings),
    TargetPractice(TargetPracticeSettings),
    /// A catalog mod without effect on beatmap stats
    Other(Acronym),
}

impl ModKind {
    pub fn acronym(&self) -> &str {
        match self {
            Self::Easy => "EZ",
            Self::HardRock => "HR",
            Self::HalfTime(_) => "HT",
            Self::Daycore(_) => "DC",
            Self::DoubleTime(_) => "DT",
            Self::Nightcore(_) => "NC",
            Self::DifficultyAdjust(_) => "DA",
            Self::TargetPractice(_) => "TP",
            Self::Other(acronym) => acronym.as_str(),
        }
    }

    /// Effective speed change for rate-changing mods
    pub fn speed_change(&self) -> Option<f64> {
        match self {
            Self::HalfTime(rate) | Self::Daycore(rate) => {
                Some(rate.speed_or(HALF_TIME_DEFAULT_SPEED))
            }
            Self::DoubleTime(rate) | Self::Nightcore(rate) => {
                Some(rate.speed_or(DOUBLE_TIME_DEFAULT_SPEED))
            }
            _ => None,
        }
    }

    /// Whether every setting matches its documented default
    pub fn is_default(&self) -> bool {
        match self {
            Self::HalfTime(rate) | Self::Daycore(rate) => rate.is_default(HALF_TIME_DEFAULT_SPEED),
            Self::DoubleTime(rate) | Self::Nightcore(rate) => {
                rate.is_default(DOUBLE_TIME_DEFAULT_SPEED)
            }
            Self::DifficultyAdjust(settings) => settings.is_default(),
            Self::TargetPractice(_) => false,
            Self::Easy | Self::HardRock | Self::Other(_) => true,
        }
    }

    fn settings_value(&self) -> Result<Value> {
        let value = match self {
            Self::HalfTime(rate)
            | Self::Daycore(rate)
            | Self::DoubleTime(rate)
            | Self::Nightcore(rate) => serde_json::to_value(rate)?,
            Self::DifficultyAdjust(settings) => serde_json::to_value(settings)?,
            Self::TargetPractice(settings) => serde_json::to_value(settings)?,
            Self::Easy | Self::HardRock | Self::Other(_) => Value::Object(Map::new()),
        };
        Ok(value)
    }
}

/// A mod bound to a ruleset
#[derive(Debug, Clone, PartialEq)]
pub struct GameMod {
    ruleset: Ruleset,
    kind: ModKind,
}

impl GameMod {
    /// Build a mod with default settings.
    ///
    /// Fails for mods with required settings, such as target practice.
    pub fn new(ruleset: Ruleset, acronym: &str) -> Result<Self> {
        Self::from_raw(ruleset, &RawMod::new(acronym))
    }

    /// Build a mod from an already typed kind, checking it belongs to the ruleset
    pub fn from_kind(ruleset: Ruleset, kind: ModKind) -> Result<Self> {
        if !ruleset.supports_mod(kind.acronym()) {
            return Err(Error::UnknownMod {
                ruleset,
                acronym: kind.acronym().to_string(),
            });
        }
        validate(&kind)?;
        Ok(Self { ruleset, kind })
    }

    /// Build a mod from its API representation
    pub fn from_raw(ruleset: Ruleset, raw: &RawMod) -> Result<Self> {
        let acronym = Acronym::new(&raw.acronym);
        if !ruleset.supports_mod(acronym.as_str()) {
            return Err(Error::UnknownMod {
                ruleset,
                acronym: acronym.into(),
            });
        }

        let code = acronym.as_str().to_owned();
        let kind = match code.as_str() {
            "EZ" => ModKind::Easy,
            "HR" => ModKind::HardRock,
            "HT" => ModKind::HalfTime(parse_settings(&acronym, raw)?),
            "DC" => ModKind::Daycore(parse_settings(&acronym, raw)?),
            "DT" => ModKind::DoubleTime(parse_settings(&acronym, raw)?),
            "NC" => ModKind::Nightcore(parse_settings(&acronym, raw)?),
            "DA" => ModKind::DifficultyAdjust(parse_settings(&acronym, raw)?),
            "TP" => {
                if !raw.settings.contains_key("seed") {
                    return Err(Error::MissingModSetting {
                        acronym: acronym.into(),
                        setting: "seed",
                    });
                }
                ModKind::TargetPractice(parse_settings(&acronym, raw)?)
            }
            _ => ModKind::Other(acronym),
        };

        validate(&kind)?;
        Ok(Self { ruleset, kind })
    }

    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    pub fn kind(&self) -> &ModKind {
        &self.kind
    }

    pub fn acronym(&self) -> &str {
        self.kind.acronym()
    }

    /// Whether every setting matches its documented default
    pub fn is_default(&self) -> bool {
        self.kind.is_default()
    }

    /// Whether this mod forces star rating re-estimation on its ruleset
    pub fn changes_star_rating(&self) -> bool {
        self.ruleset.changes_star_rating(self.acronym())
    }

    /// Convert back to the API representation
    pub fn to_raw(&self) -> Result<RawMod> {
        let settings = match self.kind.settings_value()? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(RawMod {
            acronym: self.acronym().to_string(),
            settings,
        })
    }

    /// Produce a new beatmap with this mod's effect applied
    pub fn apply(&self, beatmap: &Beatmap) -> Beatmap {
        let stats = beatmap.stats;
        match &self.kind {
            ModKind::Easy => beatmap.copy(BeatmapOverrides::new().with_stats(BeatmapStats {
                ar: stats.ar * EASY_MULTIPLIER,
                cs: stats.cs * EASY_MULTIPLIER,
                od: stats.od * EASY_MULTIPLIER,
                hp: stats.hp * EASY_MULTIPLIER,
            })),
            ModKind::HardRock => beatmap.copy(BeatmapOverrides::new().with_stats(BeatmapStats {
                ar: (stats.ar * HARD_ROCK_MULTIPLIER).min(HARD_ROCK_CAP),
                cs: (stats.cs * HARD_ROCK_CS_MULTIPLIER).min(HARD_ROCK_CAP),
                od: (stats.od * HARD_ROCK_MULTIPLIER).min(HARD_ROCK_CAP),
                hp: (stats.hp * HARD_ROCK_MULTIPLIER).min(HARD_ROCK_CAP),
            })),
            ModKind::HalfTime(_)
            | ModKind::Daycore(_)
            | ModKind::DoubleTime(_)
            | ModKind::Nightcore(_) => match self.kind.speed_change() {
                Some(speed) => apply_rate(beatmap, speed),
                None => beatmap.clone(),
            },
            ModKind::DifficultyAdjust(settings) => {
                beatmap.copy(BeatmapOverrides::new().with_stats(BeatmapStats {
                    ar: settings.approach_rate.unwrap_or(stats.ar),
                    cs: settings.circle_size.unwrap_or(stats.cs),
                    od: settings.overall_difficulty.unwrap_or(stats.od),
                    hp: settings.drain_rate.unwrap_or(stats.hp),
                }))
            }
            ModKind::TargetPractice(_) => {
                beatmap.copy(BeatmapOverrides::new().with_stats(BeatmapStats {
                    ar: stats.ar / 2.0,
                    ..stats
                }))
            }
            ModKind::Other(_) => beatmap.clone(),
        }
    }
}

impl fmt::Display for GameMod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.acronym())?;
        if let Some(speed) = self.kind.speed_change() {
            if !self.is_default() {
                write!(f, "({:.2}x)", speed)?;
            }
        }
        Ok(())
    }
}

/// Fold `mods` into `beatmap` following the ruleset's apply order.
///
/// Mods outside the apply order do not touch the beatmap.
pub fn apply_mods(ruleset: Ruleset, beatmap: &Beatmap, mods: &[GameMod]) -> Beatmap {
    ruleset
        .mod_apply_order()
        .iter()
        .fold(beatmap.clone(), |current, acronym| {
            mods.iter()
                .filter(|m| m.acronym() == *acronym)
                .fold(current, |current, m| m.apply(&current))
        })
}

/// Rate change: AR and OD go through their millisecond windows
fn apply_rate(beatmap: &Beatmap, speed: f64) -> Beatmap {
    let stats = beatmap.stats;
    let ar = ms_to_approach_rate(approach_rate_to_ms(stats.ar) / speed);
    let od = ms_to_overall_difficulty(overall_difficulty_to_ms(stats.od) / speed);

    beatmap.copy(
        BeatmapOverrides::new()
            .with_stats(BeatmapStats { ar, od, ..stats })
            .with_length_seconds(beatmap.length_seconds / speed)
            .with_song(Song {
                bpm: beatmap.song.bpm * speed,
                length_seconds: beatmap.song.length_seconds / speed,
                ..beatmap.song.clone()
            }),
    )
}

fn parse_settings<T>(acronym: &Acronym, raw: &RawMod) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(Value::Object(raw.settings.clone())).map_err(|e| {
        Error::InvalidModSetting {
            acronym: acronym.to_string(),
            setting: "settings".to_string(),
            message: e.to_string(),
        }
    })
}

fn validate(kind: &ModKind) -> Result<()> {
    let invalid = |setting: &str, message: String| Error::InvalidModSetting {
        acronym: kind.acronym().to_string(),
        setting: setting.to_string(),
        message,
    };

    if let Some(speed) = kind.speed_change() {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(invalid(
                "speed_change",
                format!("must be a positive number, got {}", speed),
            ));
        }
    }

    if let ModKind::DifficultyAdjust(settings) = kind {
        for (name, value) in settings.values() {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(invalid(name, format!("must be finite, got {}", value)));
                }
            }
        }
    }

    Ok(())
}
