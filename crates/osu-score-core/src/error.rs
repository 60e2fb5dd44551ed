//! Error types for osu-score-core

use thiserror::Error;

use crate::ruleset::Ruleset;

/// Main error type for osu-score operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Mod {acronym} requires the `{setting}` setting")]
    MissingModSetting {
        acronym: String,
        setting: &'static str,
    },

    #[error("Invalid `{setting}` setting for mod {acronym}: {message}")]
    InvalidModSetting {
        acronym: String,
        setting: String,
        message: String,
    },

    #[error("Unknown mod {acronym} for ruleset {ruleset}")]
    UnknownMod { ruleset: Ruleset, acronym: String },

    #[error("Ruleset mismatch: expected {expected}, got {actual}")]
    RulesetMismatch { expected: Ruleset, actual: Ruleset },

    #[error("Unknown ruleset: {0}")]
    UnknownRuleset(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Expected {expected} hitcounts, got {actual}")]
    HitcountLength { expected: usize, actual: usize },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for osu-score operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("Request timed out: {}", e)
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else if e.is_decode() {
            format!("Invalid response body: {}", e)
        } else if let Some(status) = e.status() {
            format!("HTTP {} error: {}", status.as_u16(), e)
        } else {
            format!("Request error: {}", e)
        };
        Error::Http(message)
    }
}
