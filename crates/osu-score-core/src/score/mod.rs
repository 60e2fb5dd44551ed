//! Scores: raw play records bound to a beatmap and estimation providers
//!
//! A [`BeatmapScore`] derives its modded beatmap and its star rating / pp
//! estimates lazily. Each derived value is computed at most once per score;
//! concurrent callers of the async getters await the same computation.

mod hitcounts;
mod rank;

pub use hitcounts::*;
pub use rank::*;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::beatmap::{Beatmap, BeatmapOverrides};
use crate::error::{Error, Result};
use crate::estimation::EstimationProviders;
use crate::mods::{apply_mods, GameMod};
use crate::ruleset::Ruleset;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one score instance.
///
/// Two structurally identical scores get different handles, since they are
/// different plays. Estimation caches are keyed by this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScoreHandle(u64);

impl ScoreHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw play record as produced by adapter code
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreInfo<H: Hitcounts> {
    /// Online score ID, absent for unsubmitted plays
    pub score_id: Option<u64>,
    pub ended_at: DateTime<Utc>,
    pub passed: bool,
    /// Fraction of the beatmap that was played, in (0, 1]
    pub map_progress: f64,
    pub mods: Vec<GameMod>,
    pub total_score: u64,
    /// Highest combo reached
    pub max_combo: u32,
    pub hitcounts: H,
    /// Accuracy in percent, in [0, 100]
    pub accuracy: f64,
    pub rank: Rank,
    /// Performance points awarded by the server, if any
    pub pp: Option<f64>,
}

/// A play on a beatmap, with lazily derived difficulty and estimates
pub struct BeatmapScore<H: Hitcounts> {
    handle: ScoreHandle,
    info: ScoreInfo<H>,
    base_beatmap: Beatmap,
    providers: EstimationProviders<H>,
    has_star_rating_changing_mods: OnceLock<bool>,
    modded_beatmap: OnceLock<Beatmap>,
    estimated_star_rating: OnceCell<Option<f64>>,
    estimated_pp: OnceCell<Option<f64>>,
}

impl<H: Hitcounts> BeatmapScore<H> {
    /// Bind a play record to its beatmap.
    ///
    /// The beatmap and every mod must belong to the hitcounts' ruleset.
    pub fn new(
        info: ScoreInfo<H>,
        base_beatmap: Beatmap,
        providers: EstimationProviders<H>,
    ) -> Result<Self> {
        let ruleset = H::RULESET;
        if base_beatmap.ruleset != ruleset {
            return Err(Error::RulesetMismatch {
                expected: ruleset,
                actual: base_beatmap.ruleset,
            });
        }
        if let Some(game_mod) = info.mods.iter().find(|m| m.ruleset() != ruleset) {
            return Err(Error::RulesetMismatch {
                expected: ruleset,
                actual: game_mod.ruleset(),
            });
        }
        if !(info.map_progress > 0.0 && info.map_progress <= 1.0) {
            return Err(Error::InvalidScore(format!(
                "map progress must be in (0, 1], got {}",
                info.map_progress
            )));
        }
        if !(0.0..=100.0).contains(&info.accuracy) {
            return Err(Error::InvalidScore(format!(
                "accuracy must be in [0, 100], got {}",
                info.accuracy
            )));
        }

        Ok(Self {
            handle: ScoreHandle::next(),
            info,
            base_beatmap,
            providers,
            has_star_rating_changing_mods: OnceLock::new(),
            modded_beatmap: OnceLock::new(),
            estimated_star_rating: OnceCell::new(),
            estimated_pp: OnceCell::new(),
        })
    }

    pub fn handle(&self) -> ScoreHandle {
        self.handle
    }

    pub fn ruleset(&self) -> Ruleset {
        H::RULESET
    }

    pub fn info(&self) -> &ScoreInfo<H> {
        &self.info
    }

    pub fn base_beatmap(&self) -> &Beatmap {
        &self.base_beatmap
    }

    pub fn mods(&self) -> &[GameMod] {
        &self.info.mods
    }

    pub fn hitcounts(&self) -> &H {
        &self.info.hitcounts
    }

    pub fn accuracy(&self) -> f64 {
        self.info.accuracy
    }

    pub fn map_progress(&self) -> f64 {
        self.info.map_progress
    }

    pub fn max_combo(&self) -> u32 {
        self.info.max_combo
    }

    /// Find an applied mod by acronym (case-insensitive)
    pub fn find_mod(&self, acronym: &str) -> Option<&GameMod> {
        self.info
            .mods
            .iter()
            .find(|m| m.acronym().eq_ignore_ascii_case(acronym))
    }

    /// Whether any applied mod invalidates the beatmap's star rating
    pub fn has_star_rating_changing_mods(&self) -> bool {
        *self
            .has_star_rating_changing_mods
            .get_or_init(|| self.info.mods.iter().any(GameMod::changes_star_rating))
    }

    /// The base beatmap with every mod folded in.
    ///
    /// Its star rating is unknown whenever a star-rating-changing mod is applied.
    pub fn modded_beatmap(&self) -> &Beatmap {
        self.modded_beatmap.get_or_init(|| {
            let modded = apply_mods(H::RULESET, &self.base_beatmap, &self.info.mods);
            if self.has_star_rating_changing_mods() {
                modded.copy(BeatmapOverrides::new().with_star_rating(None))
            } else {
                modded
            }
        })
    }

    /// Whether the play reached the beatmap's maximum combo
    pub fn is_full_combo(&self) -> bool {
        self.base_beatmap.max_combo == Some(self.info.max_combo)
    }

    /// Star rating of the modded beatmap, estimated if not known locally
    pub async fn get_estimated_star_rating(&self) -> Option<f64> {
        *self
            .estimated_star_rating
            .get_or_init(|| async {
                let modded = self.modded_beatmap();
                if modded.has_known_star_rating() {
                    return modded.star_rating;
                }
                self.providers
                    .star_rating
                    .get_estimation(self)
                    .await
                    .filter(|value| value.is_finite())
            })
            .await
    }

    /// pp of the play, estimated if the server did not award any
    pub async fn get_estimated_pp(&self) -> Option<f64> {
        *self
            .estimated_pp
            .get_or_init(|| async {
                if let Some(pp) = self.info.pp {
                    return Some(pp);
                }
                self.providers
                    .pp
                    .get_estimation(self)
                    .await
                    .filter(|value| value.is_finite())
            })
            .await
    }
}

impl<H: Hitcounts> fmt::Debug for BeatmapScore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeatmapScore")
            .field("handle", &self.handle)
            .field("info", &self.info)
            .field("beatmap_id", &self.base_beatmap.id)
            .finish_non_exhaustive()
    }
}

/// A score of any ruleset
#[derive(Debug)]
pub enum AnyScore {
    Osu(BeatmapScore<OsuHitcounts>),
    Taiko(BeatmapScore<TaikoHitcounts>),
    Catch(BeatmapScore<CatchHitcounts>),
    Mania(BeatmapScore<ManiaHitcounts>),
}

macro_rules! dispatch {
    ($score:expr, $inner:ident => $body:expr) => {
        match $score {
            AnyScore::Osu($inner) => $body,
            AnyScore::Taiko($inner) => $body,
            AnyScore::Catch($inner) => $body,
            AnyScore::Mania($inner) => $body,
        }
    };
}

impl AnyScore {
    pub fn ruleset(&self) -> Ruleset {
        match self {
            Self::Osu(_) => Ruleset::Osu,
            Self::Taiko(_) => Ruleset::Taiko,
            Self::Catch(_) => Ruleset::Catch,
            Self::Mania(_) => Ruleset::Mania,
        }
    }

    pub fn handle(&self) -> ScoreHandle {
        dispatch!(self, score => score.handle())
    }

    pub fn hitcounts(&self) -> AnyHitcounts {
        dispatch!(self, score => score.hitcounts().into_any())
    }

    pub fn accuracy(&self) -> f64 {
        dispatch!(self, score => score.accuracy())
    }

    pub fn rank(&self) -> Rank {
        dispatch!(self, score => score.info().rank)
    }

    pub fn modded_beatmap(&self) -> &Beatmap {
        dispatch!(self, score => score.modded_beatmap())
    }

    pub fn has_star_rating_changing_mods(&self) -> bool {
        dispatch!(self, score => score.has_star_rating_changing_mods())
    }

    pub async fn estimated_star_rating(&self) -> Option<f64> {
        dispatch!(self, score => score.get_estimated_star_rating().await)
    }

    pub async fn estimated_pp(&self) -> Option<f64> {
        dispatch!(self, score => score.get_estimated_pp().await)
    }
}

impl From<BeatmapScore<OsuHitcounts>> for AnyScore {
    fn from(score: BeatmapScore<OsuHitcounts>) -> Self {
        Self::Osu(score)
    }
}

impl From<BeatmapScore<TaikoHitcounts>> for AnyScore {
    fn from(score: BeatmapScore<TaikoHitcounts>) -> Self {
        Self::Taiko(score)
    }
}

impl From<BeatmapScore<CatchHitcounts>> for AnyScore {
    fn from(score: BeatmapScore<CatchHitcounts>) -> Self {
        Self::Catch(score)
    }
}

impl From<BeatmapScore<ManiaHitcounts>> for AnyScore {
    fn from(score: BeatmapScore<ManiaHitcounts>) -> Self {
        Self::Mania(score)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::beatmap::tests::sample_beatmap;
    use crate::estimation::{PpEstimationProvider, StarRatingEstimationProvider};
    use crate::mods::RawMod;

    pub(crate) fn sample_info<H: Hitcounts>(hitcounts: H) -> ScoreInfo<H> {
        ScoreInfo {
            score_id: Some(1),
            ended_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            passed: true,
            map_progress: 1.0,
            mods: Vec::new(),
            total_score: 1_000_000,
            max_combo: 800,
            hitcounts,
            accuracy: 98.5,
            rank: Rank::S,
            pp: None,
        }
    }

    /// Returns fixed estimates and counts how often it is asked
    #[derive(Default)]
    struct CountingProvider {
        star_rating_calls: AtomicUsize,
        pp_calls: AtomicUsize,
    }

    #[async_trait]
    impl StarRatingEstimationProvider<OsuHitcounts> for CountingProvider {
        async fn get_estimation(&self, _score: &BeatmapScore<OsuHitcounts>) -> Option<f64> {
            self.star_rating_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Some(6.5)
        }
    }

    #[async_trait]
    impl PpEstimationProvider<OsuHitcounts> for CountingProvider {
        async fn get_estimation(&self, _score: &BeatmapScore<OsuHitcounts>) -> Option<f64> {
            self.pp_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Some(321.0)
        }
    }

    fn osu_score(mods: &[&str], provider: Arc<CountingProvider>) -> BeatmapScore<OsuHitcounts> {
        let mut info = sample_info(OsuHitcounts::new(780, 15, 3, 2));
        info.mods = mods
            .iter()
            .map(|acronym| GameMod::new(Ruleset::Osu, acronym).unwrap())
            .collect();
        BeatmapScore::new(
            info,
            sample_beatmap(),
            EstimationProviders::from_shared(provider),
        )
        .unwrap()
    }

    #[test]
    fn test_handles_are_unique() {
        let provider = Arc::new(CountingProvider::default());
        let a = osu_score(&[], provider.clone());
        let b = osu_score(&[], provider);
        assert_eq!(a.info(), b.info());
        assert_ne!(a.handle(), b.handle());

        // Same record, same beatmap: still two distinct plays
        let c = BeatmapScore::new(
            a.info().clone(),
            a.base_beatmap().clone(),
            EstimationProviders::unsupported(),
        )
        .unwrap();
        assert_eq!(c.info(), a.info());
        assert_ne!(c.handle(), a.handle());
        assert_ne!(c.handle(), b.handle());
    }

    #[test]
    fn test_new_rejects_ruleset_mismatch() {
        let taiko_map = sample_beatmap().copy(BeatmapOverrides::new().with_ruleset(Ruleset::Taiko));
        let err = BeatmapScore::new(
            sample_info(OsuHitcounts::default()),
            taiko_map,
            EstimationProviders::unsupported(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::RulesetMismatch {
                expected: Ruleset::Osu,
                actual: Ruleset::Taiko
            }
        ));

        let mut info = sample_info(OsuHitcounts::default());
        info.mods = vec![GameMod::new(Ruleset::Mania, "4K").unwrap()];
        let err = BeatmapScore::new(info, sample_beatmap(), EstimationProviders::unsupported())
            .unwrap_err();
        assert!(matches!(err, Error::RulesetMismatch { .. }));
    }

    #[test]
    fn test_new_validates_ranges() {
        let build = |progress: f64, accuracy: f64| {
            let mut info = sample_info(OsuHitcounts::default());
            info.map_progress = progress;
            info.accuracy = accuracy;
            BeatmapScore::new(info, sample_beatmap(), EstimationProviders::unsupported())
        };

        assert!(build(1.0, 100.0).is_ok());
        assert!(build(0.25, 0.0).is_ok());
        assert!(matches!(build(0.0, 90.0), Err(Error::InvalidScore(_))));
        assert!(build(1.5, 90.0).is_err());
        assert!(build(f64::NAN, 90.0).is_err());
        assert!(build(1.0, 100.5).is_err());
        assert!(build(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_star_rating_changing_mods() {
        let provider = Arc::new(CountingProvider::default());
        assert!(osu_score(&["HT"], provider.clone()).has_star_rating_changing_mods());
        assert!(osu_score(&["HD", "FL"], provider.clone()).has_star_rating_changing_mods());
        assert!(!osu_score(&["HD", "NF"], provider.clone()).has_star_rating_changing_mods());
        assert!(!osu_score(&[], provider).has_star_rating_changing_mods());
    }

    #[test]
    fn test_modded_beatmap_clears_star_rating() {
        let provider = Arc::new(CountingProvider::default());

        let ht = osu_score(&["HT"], provider.clone());
        let modded = ht.modded_beatmap();
        assert!((modded.stats.ar - 7.666_667).abs() < 1e-3);
        assert_eq!(modded.star_rating, None);
        assert_eq!(ht.base_beatmap().star_rating, Some(5.25));

        let hidden = osu_score(&["HD"], provider);
        assert_eq!(hidden.modded_beatmap(), hidden.base_beatmap());
    }

    #[test]
    fn test_modded_beatmap_with_difficulty_adjust() {
        let mut info = sample_info(OsuHitcounts::default());
        info.mods = vec![GameMod::from_raw(
            Ruleset::Osu,
            &RawMod::new("DA").with_setting("circle_size", 5),
        )
        .unwrap()];
        let score =
            BeatmapScore::new(info, sample_beatmap(), EstimationProviders::unsupported()).unwrap();

        let stats = score.modded_beatmap().stats;
        assert_eq!((stats.ar, stats.cs, stats.od, stats.hp), (9.0, 5.0, 8.0, 5.0));
        assert!(score.has_star_rating_changing_mods());
    }

    #[test]
    fn test_full_combo() {
        let provider = Arc::new(CountingProvider::default());
        let score = osu_score(&[], provider);
        assert!(score.is_full_combo());

        let mut info = sample_info(OsuHitcounts::default());
        info.max_combo = 500;
        let score =
            BeatmapScore::new(info, sample_beatmap(), EstimationProviders::unsupported()).unwrap();
        assert!(!score.is_full_combo());

        let no_combo = sample_beatmap().copy(BeatmapOverrides::new().with_max_combo(None));
        let score = BeatmapScore::new(
            sample_info(OsuHitcounts::default()),
            no_combo,
            EstimationProviders::unsupported(),
        )
        .unwrap();
        assert!(!score.is_full_combo());
    }

    #[tokio::test]
    async fn test_known_star_rating_skips_provider() {
        let provider = Arc::new(CountingProvider::default());
        let score = osu_score(&["HD"], provider.clone());
        assert_eq!(score.get_estimated_star_rating().await, Some(5.25));
        assert_eq!(provider.star_rating_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_star_rating_estimated_once() {
        let provider = Arc::new(CountingProvider::default());
        let score = osu_score(&["DT"], provider.clone());

        let (a, b) = tokio::join!(
            score.get_estimated_star_rating(),
            score.get_estimated_star_rating()
        );
        assert_eq!(a, Some(6.5));
        assert_eq!(b, Some(6.5));
        assert_eq!(score.get_estimated_star_rating().await, Some(6.5));
        assert_eq!(provider.star_rating_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pp_estimated_once() {
        let provider = Arc::new(CountingProvider::default());
        let score = osu_score(&[], provider.clone());

        let (a, b) = tokio::join!(score.get_estimated_pp(), score.get_estimated_pp());
        assert_eq!(a, Some(321.0));
        assert_eq!(b, Some(321.0));
        assert_eq!(score.get_estimated_pp().await, Some(321.0));
        assert_eq!(provider.pp_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_pp_wins() {
        let provider = Arc::new(CountingProvider::default());
        let mut info = sample_info(OsuHitcounts::default());
        info.pp = Some(250.0);
        let score = BeatmapScore::new(
            info,
            sample_beatmap(),
            EstimationProviders::from_shared(provider.clone()),
        )
        .unwrap();

        assert_eq!(score.get_estimated_pp().await, Some(250.0));
        assert_eq!(provider.pp_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_any_score_dispatch() {
        let provider = Arc::new(CountingProvider::default());
        let score: AnyScore = osu_score(&["HT"], provider.clone()).into();
        assert_eq!(score.ruleset(), Ruleset::Osu);
        assert_eq!(score.hitcounts().as_slice(), &[780, 15, 3, 2]);
        assert!(score.has_star_rating_changing_mods());
        assert_eq!(score.estimated_star_rating().await, Some(6.5));
        assert_eq!(score.estimated_pp().await, Some(321.0));
        assert_eq!(score.rank(), Rank::S);
    }
}
