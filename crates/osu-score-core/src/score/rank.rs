//! Letter grade of a play

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Grade/rank achieved on a play, as named by the osu! API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// SS with hidden/flashlight
    #[serde(rename = "XH")]
    SilverSS,
    #[serde(rename = "X")]
    SS,
    /// S with hidden/flashlight
    #[serde(rename = "SH")]
    SilverS,
    S,
    A,
    B,
    C,
    D,
    /// Failed
    F,
}

impl Rank {
    /// API code of the rank
    pub fn code(&self) -> &'static str {
        match self {
            Rank::SilverSS => "XH",
            Rank::SS => "X",
            Rank::SilverS => "SH",
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::F => "F",
        }
    }

    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::SilverSS | Rank::SS => "SS",
            Rank::SilverS | Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::F => "F",
        }
    }

    pub fn is_pass(&self) -> bool {
        *self != Rank::F
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XH" | "SSH" => Ok(Rank::SilverSS),
            "X" | "SS" => Ok(Rank::SS),
            "SH" => Ok(Rank::SilverS),
            "S" => Ok(Rank::S),
            "A" => Ok(Rank::A),
            "B" => Ok(Rank::B),
            "C" => Ok(Rank::C),
            "D" => Ok(Rank::D),
            "F" => Ok(Rank::F),
            other => Err(Error::InvalidScore(format!("unknown rank `{}`", other))),
        }
    }
}
