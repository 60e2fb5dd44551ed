//! # osu-score-core
//!
//! Score and mod domain model for the four osu! rulesets, with cached star
//! rating and pp estimation through an external score simulation service.
//!
//! This crate provides the foundational functionality for:
//! - Immutable beatmaps with copy-with-overrides
//! - Per-ruleset hitcounts with a fixed judgement order
//! - Gameplay mods applied as pure beatmap transforms, in ruleset order
//! - Scores that derive their modded beatmap and estimates lazily, at most once
//! - A simulation-backed estimation provider that deduplicates remote calls
//!
//! ## Modules
//!
//! - [`beatmap`] - Beatmap, stats, set and song metadata
//! - [`config`] - Configuration file
//! - [`error`] - Error types and Result alias
//! - [`estimation`] - Estimation capabilities and the simulation-backed provider
//! - [`mods`] - Mods, their settings and the apply pipeline
//! - [`ruleset`] - Rulesets and their mod rules
//! - [`score`] - Hitcounts, ranks and scores
//! - [`simulation`] - Score simulation service contract and HTTP client
//!
//! ## Example
//!
//! ```
//! use osu_score_core::{apply_mods, GameMod, RawMod, Ruleset};
//! # use osu_score_core::{Beatmap, BeatmapStats, Beatmapset, RankedStatus, Song};
//! # let beatmap = Beatmap {
//! #     id: 100,
//! #     ruleset: Ruleset::Osu,
//! #     difficulty_name: "Insane".to_string(),
//! #     stats: BeatmapStats::new(9.0, 4.0, 8.0, 5.0),
//! #     star_rating: Some(5.25),
//! #     length_seconds: 120.0,
//! #     max_combo: Some(800),
//! #     beatmapset: Beatmapset { id: 10, creator: "mapper".to_string(), status: RankedStatus::Ranked },
//! #     song: Song { artist: "artist".to_string(), title: "title".to_string(), bpm: 180.0, length_seconds: 120.0 },
//! # };
//!
//! let half_time = GameMod::new(Ruleset::Osu, "HT")?;
//! let adjust = GameMod::from_raw(
//!     Ruleset::Osu,
//!     &RawMod::new("DA").with_setting("circle_size", 5.0),
//! )?;
//!
//! let modded = apply_mods(Ruleset::Osu, &beatmap, &[half_time, adjust]);
//! assert_eq!(modded.stats.cs, 5.0);
//! assert!(modded.stats.ar < beatmap.stats.ar);
//! # Ok::<(), osu_score_core::Error>(())
//! ```

// Module declarations
pub mod beatmap;
pub mod config;
pub mod error;
pub mod estimation;
pub mod mods;
pub mod ruleset;
pub mod score;
pub mod simulation;

// Re-export key types for convenience

// Error types
pub use error::{Error, Result};

// Beatmap types
pub use beatmap::{Beatmap, BeatmapOverrides, BeatmapStats, Beatmapset, RankedStatus, Song};

// Configuration
pub use config::{Config, EstimationConfig, SimulationConfig};

// Rulesets and mods
pub use mods::{apply_mods, Acronym, GameMod, ModKind, RawMod};
pub use ruleset::Ruleset;

// Scores
pub use score::{
    AnyHitcounts, AnyScore, BeatmapScore, CatchHitcounts, Hitcounts, ManiaHitcounts,
    OsuHitcounts, Rank, ScoreHandle, ScoreInfo, TaikoHitcounts,
};

// Estimation
pub use estimation::{
    solve_accuracy_split, CachePolicy, EstimationProviders, HitSplit, PpEstimationProvider,
    ScoreSimEstimationProvider, SimulationCache, SimulationMode, StarRatingEstimationProvider,
    UnsupportedEstimationProvider,
};

// Simulation service
pub use simulation::{
    HttpSimulationDao, ScoreSimulationDao, SimulationParams, SimulationRequest, SimulationResult,
};
