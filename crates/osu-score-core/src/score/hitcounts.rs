//! Per-ruleset hit result counts
//!
//! Each ruleset stores its counts in a fixed-position array. The position of
//! every judgement is part of the external contract and must not change.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ruleset::Ruleset;

/// Ordered judgement counts of a single ruleset
pub trait Hitcounts:
    Clone + Copy + std::fmt::Debug + PartialEq + Default + Send + Sync + 'static
{
    const RULESET: Ruleset;
    const LEN: usize;

    /// Judgement names in storage order
    fn names() -> &'static [&'static str];

    /// Counts in storage order
    fn as_slice(&self) -> &[u32];

    /// Build from counts in storage order
    fn from_slice(values: &[u32]) -> Result<Self>;

    /// Number of misses
    fn miss(&self) -> u32;

    /// Sum of every judgement, saturating at `u32::MAX`
    fn total(&self) -> u32 {
        self.as_slice()
            .iter()
            .fold(0u32, |total, &count| total.saturating_add(count))
    }

    fn into_any(self) -> AnyHitcounts;
}

macro_rules! define_hitcounts {
    (@count $($field:ident)+) => {
        <[()]>::len(&[$(define_hitcounts!(@unit $field)),+])
    };
    (@unit $field:ident) => {
        ()
    };
    (
        $(#[$meta:meta])*
        $name:ident: $ruleset:expr, miss = $miss:ident,
        [$($idx:literal => $field:ident / $setter:ident),+ $(,)?]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            values: [u32; define_hitcounts!(@count $($field)+)],
        }

        impl $name {
            pub const NAMES: [&'static str; define_hitcounts!(@count $($field)+)] =
                [$(stringify!($field)),+];

            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: u32),+) -> Self {
                Self { values: [$($field),+] }
            }

            $(
                pub fn $field(&self) -> u32 {
                    self.values[$idx]
                }

                pub fn $setter(&mut self, value: u32) {
                    self.values[$idx] = value;
                }
            )+
        }

        impl Hitcounts for $name {
            const RULESET: Ruleset = $ruleset;
            const LEN: usize = define_hitcounts!(@count $($field)+);

            fn names() -> &'static [&'static str] {
                &Self::NAMES
            }

            fn as_slice(&self) -> &[u32] {
                &self.values
            }

            fn from_slice(values: &[u32]) -> Result<Self> {
                let values = values.try_into().map_err(|_| Error::HitcountLength {
                    expected: Self::LEN,
                    actual: values.len(),
                })?;
                Ok(Self { values })
            }

            fn miss(&self) -> u32 {
                self.$miss()
            }

            fn into_any(self) -> AnyHitcounts {
                AnyHitcounts::from(self)
            }
        }
    };
}

define_hitcounts! {
    /// osu!standard counts: great (300), ok (100), meh (50), miss
    OsuHitcounts: Ruleset::Osu, miss = miss,
    [0 => great / set_great, 1 => ok / set_ok, 2 => meh / set_meh, 3 => miss / set_miss]
}

define_hitcounts! {
    /// osu!taiko counts: great, ok, miss
    TaikoHitcounts: Ruleset::Taiko, miss = miss,
    [0 => great / set_great, 1 => ok / set_ok, 2 => miss / set_miss]
}

define_hitcounts! {
    /// osu!catch counts: fruits, drops, droplets, missed droplets, misses
    CatchHitcounts: Ruleset::Catch, miss = miss,
    [
        0 => great / set_great,
        1 => large_tick_hit / set_large_tick_hit,
        2 => small_tick_hit / set_small_tick_hit,
        3 => small_tick_miss / set_small_tick_miss,
        4 => miss / set_miss,
    ]
}

define_hitcounts! {
    /// osu!mania counts: perfect (MAX), great, good, ok, meh, miss
    ManiaHitcounts: Ruleset::Mania, miss = miss,
    [
        0 => perfect / set_perfect,
        1 => great / set_great,
        2 => good / set_good,
        3 => ok / set_ok,
        4 => meh / set_meh,
        5 => miss / set_miss,
    ]
}

/// Hitcounts of any ruleset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyHitcounts {
    Osu(OsuHitcounts),
    Taiko(TaikoHitcounts),
    Catch(CatchHitcounts),
    Mania(ManiaHitcounts),
}

impl AnyHitcounts {
    pub fn ruleset(&self) -> Ruleset {
        match self {
            Self::Osu(_) => Ruleset::Osu,
            Self::Taiko(_) => Ruleset::Taiko,
            Self::Catch(_) => Ruleset::Catch,
            Self::Mania(_) => Ruleset::Mania,
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        match self {
            Self::Osu(h) => h.as_slice(),
            Self::Taiko(h) => h.as_slice(),
            Self::Catch(h) => h.as_slice(),
            Self::Mania(h) => h.as_slice(),
        }
    }

    pub fn miss(&self) -> u32 {
        match self {
            Self::Osu(h) => h.miss(),
            Self::Taiko(h) => h.miss(),
            Self::Catch(h) => h.miss(),
            Self::Mania(h) => h.miss(),
        }
    }

    /// Build the variant of `ruleset` from counts in storage order
    pub fn from_slice(ruleset: Ruleset, values: &[u32]) -> Result<Self> {
        Ok(match ruleset {
            Ruleset::Osu => Self::Osu(OsuHitcounts::from_slice(values)?),
            Ruleset::Taiko => Self::Taiko(TaikoHitcounts::from_slice(values)?),
            Ruleset::Catch => Self::Catch(CatchHitcounts::from_slice(values)?),
            Ruleset::Mania => Self::Mania(ManiaHitcounts::from_slice(values)?),
        })
    }
}

impl From<OsuHitcounts> for AnyHitcounts {
    fn from(value: OsuHitcounts) -> Self {
        Self::Osu(value)
    }
}

impl From<TaikoHitcounts> for AnyHitcounts {
    fn from(value: TaikoHitcounts) -> Self {
        Self::Taiko(value)
    }
}

impl From<CatchHitcounts> for AnyHitcounts {
    fn from(value: CatchHitcounts) -> Self {
        Self::Catch(value)
    }
}

impl From<ManiaHitcounts> for AnyHitcounts {
    fn from(value: ManiaHitcounts) -> Self {
        Self::Mania(value)
    }
}
