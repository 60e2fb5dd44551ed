//! Rulesets and their per-ruleset mod rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the four osu! game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ruleset {
    Osu = 0,
    Taiko = 1,
    Catch = 2,
    Mania = 3,
}

const OSU_APPLY_ORDER: &[&str] = &["EZ", "HR", "DA", "HT", "DC", "DT", "NC", "TP"];
const TAIKO_APPLY_ORDER: &[&str] = &["EZ", "HR", "DA", "HT", "DC", "DT", "NC"];
const CATCH_APPLY_ORDER: &[&str] = &["EZ", "HR", "DA", "HT", "DC", "DT", "NC"];
const MANIA_APPLY_ORDER: &[&str] = &["EZ", "HR", "DA", "HT", "DC", "DT", "NC"];

const OSU_STAR_RATING_MODS: &[&str] = &[
    "EZ", "HR", "HT", "DC", "DT", "NC", "DA", "TP", "FL", "RX", "AP", "RD", "TD", "WU", "WD", "AS",
];
const TAIKO_STAR_RATING_MODS: &[&str] = &[
    "EZ", "HR", "HT", "DC", "DT", "NC", "DA", "RX", "RD", "SW", "CS", "WU", "WD", "AS",
];
const CATCH_STAR_RATING_MODS: &[&str] = &[
    "EZ", "HR", "HT", "DC", "DT", "NC", "DA", "FL", "RX", "WU", "WD",
];
const MANIA_STAR_RATING_MODS: &[&str] = &[
    "EZ", "HR", "HT", "DC", "DT", "NC", "DA", "RD", "IN", "HO", "CS", "DS", "WU", "WD", "AS",
    "1K", "2K", "3K", "4K", "5K", "6K", "7K", "8K", "9K", "10K",
];

// Mods that only affect scoring or visuals
const OSU_NEUTRAL_MODS: &[&str] = &[
    "NF", "SD", "PF", "HD", "TC", "BL", "ST", "CL", "MR", "AL", "SG", "MU", "NS", "SO", "GR", "DF",
    "TR", "WG", "BR", "AD", "SI", "BM", "BU", "FR", "SY", "DP",
];
const TAIKO_NEUTRAL_MODS: &[&str] = &[
    "NF", "SD", "PF", "HD", "FL", "CL", "MR", "SG", "CO", "MU", "NS", "CN",
];
const CATCH_NEUTRAL_MODS: &[&str] = &["NF", "SD", "PF", "HD", "CL", "MR", "FF", "MU", "NS", "CN"];
const MANIA_NEUTRAL_MODS: &[&str] = &["NF", "SD", "PF", "HD", "FL", "FI", "CO", "MR", "CL", "NR"];

impl Ruleset {
    /// All rulesets in id order
    pub const ALL: [Ruleset; 4] = [Self::Osu, Self::Taiko, Self::Catch, Self::Mania];

    /// Numeric ruleset id as used by the osu! API
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Short name as used in osu! API routes
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Osu => "osu",
            Self::Taiko => "taiko",
            Self::Catch => "fruits",
            Self::Mania => "mania",
        }
    }

    /// The order in which mods are folded into a beatmap.
    ///
    /// Applied mods whose acronym is not listed here leave the beatmap untouched.
    pub fn mod_apply_order(self) -> &'static [&'static str] {
        match self {
            Self::Osu => OSU_APPLY_ORDER,
            Self::Taiko => TAIKO_APPLY_ORDER,
            Self::Catch => CATCH_APPLY_ORDER,
            Self::Mania => MANIA_APPLY_ORDER,
        }
    }

    /// Acronyms that invalidate a beatmap's cached star rating.
    ///
    /// Always a superset of [`Ruleset::mod_apply_order`].
    pub fn star_rating_changing_mods(self) -> &'static [&'static str] {
        match self {
            Self::Osu => OSU_STAR_RATING_MODS,
            Self::Taiko => TAIKO_STAR_RATING_MODS,
            Self::Catch => CATCH_STAR_RATING_MODS,
            Self::Mania => MANIA_STAR_RATING_MODS,
        }
    }

    fn neutral_mods(self) -> &'static [&'static str] {
        match self {
            Self::Osu => OSU_NEUTRAL_MODS,
            Self::Taiko => TAIKO_NEUTRAL_MODS,
            Self::Catch => CATCH_NEUTRAL_MODS,
            Self::Mania => MANIA_NEUTRAL_MODS,
        }
    }

    /// Iterate over every acronym this ruleset accepts
    pub fn catalog(self) -> impl Iterator<Item = &'static str> {
        self.star_rating_changing_mods()
            .iter()
            .chain(self.neutral_mods())
            .copied()
    }

    /// Check whether an acronym (case-insensitive) belongs to this ruleset
    pub fn supports_mod(self, acronym: &str) -> bool {
        self.catalog().any(|a| a.eq_ignore_ascii_case(acronym))
    }

    /// Check whether an acronym (case-insensitive) forces star rating re-estimation
    pub fn changes_star_rating(self, acronym: &str) -> bool {
        self.star_rating_changing_mods()
            .iter()
            .any(|a| a.eq_ignore_ascii_case(acronym))
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::Osu
    }
}

impl TryFrom<u8> for Ruleset {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Osu),
            1 => Ok(Self::Taiko),
            2 => Ok(Self::Catch),
            3 => Ok(Self::Mania),
            _ => Err(Error::UnknownRuleset(value.to_string())),
        }
    }
}

impl FromStr for Ruleset {
    type Err = Error;

    /// Accepts short names, common aliases and numeric ids
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "osu" | "standard" | "std" | "0" => Ok(Self::Osu),
            "taiko" | "1" => Ok(Self::Taiko),
            "fruits" | "catch" | "ctb" | "2" => Ok(Self::Catch),
            "mania" | "3" => Ok(Self::Mania),
            _ => Err(Error::UnknownRuleset(s.to_string())),
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Osu => write!(f, "osu!"),
            Self::Taiko => write!(f, "osu!taiko"),
            Self::Catch => write!(f, "osu!catch"),
            Self::Mania => write!(f, "osu!mania"),
        }
    }
}
