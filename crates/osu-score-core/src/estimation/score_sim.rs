//! Estimation backed by the score simulation service (osu! ruleset)
//!
//! Every score is simulated at most once per provider: the pending simulation
//! is stored as a shared future keyed by the score's handle before it is first
//! polled, so concurrent star rating and pp requests join the same call.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};

use super::cache::{CachePolicy, SimulationCache};
use super::{PpEstimationProvider, StarRatingEstimationProvider};
use crate::config::EstimationConfig;
use crate::mods::{GameMod, ModKind};
use crate::score::{BeatmapScore, Hitcounts, OsuHitcounts};
use crate::simulation::{
    DifficultyAdjustParams, ScoreSimulationDao, SimulationParams, SimulationRequest,
    SimulationResult,
};

type SharedSimulation = Shared<BoxFuture<'static, Option<Arc<SimulationResult>>>>;

/// Judgement weights of osu! standard accuracy: 300 / 100 / 50
const GREAT_WEIGHT: f64 = 6.0;
const OK_WEIGHT: f64 = 2.0;

/// How hit statistics are derived from a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimulationMode {
    /// Miss/meh/ok counts extrapolated from the play's own hitcounts
    #[default]
    Direct,
    /// 100s solved from accuracy, for scores where only accuracy is authoritative
    Accuracy,
}

impl SimulationMode {
    pub fn from_use_accuracy(use_accuracy: bool) -> Self {
        if use_accuracy {
            Self::Accuracy
        } else {
            Self::Direct
        }
    }
}

/// Full-play judgement split of an osu! standard score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitSplit {
    pub count300: u32,
    pub count100: u32,
    pub count50: u32,
    pub count_miss: u32,
}

/// Solve the 300/100 split reaching `accuracy` (a fraction in [0, 1]).
///
/// Misses and 50s are kept as given. Returns `None` when no split of the
/// remaining hits reaches the accuracy, including when the closest split would
/// be a perfect play for an accuracy below 100%.
pub fn solve_accuracy_split(
    total_hits: u32,
    count_miss: u32,
    count_50: u32,
    accuracy: f64,
) -> Option<HitSplit> {
    if total_hits == 0 || !accuracy.is_finite() {
        return None;
    }

    let total = f64::from(total_hits);
    let hits_available = i64::from(total_hits) - i64::from(count_miss) - i64::from(count_50);
    if hits_available < 0 {
        return None;
    }

    let available = hits_available as f64;
    let count300 =
        ((GREAT_WEIGHT * total * accuracy - OK_WEIGHT * available - f64::from(count_50)) / 4.0)
            .round();
    if !(0.0..=available).contains(&count300) {
        return None;
    }

    let count300 = count300 as u32;
    let count100 = hits_available as u32 - count300;
    if count100 == 0 && count_miss == 0 && count_50 == 0 && accuracy < 1.0 {
        return None;
    }

    Some(HitSplit {
        count300,
        count100,
        count50: count_50,
        count_miss,
    })
}

/// Owned snapshot of everything a simulation needs from a score
#[derive(Debug, Clone)]
struct SimulationPlan {
    mode: SimulationMode,
    beatmap_id: u32,
    mods: Vec<String>,
    combo: Option<u32>,
    params: SimulationParams,
    hitcounts: OsuHitcounts,
    map_progress: f64,
    accuracy: f64,
}

impl SimulationPlan {
    fn from_score(score: &BeatmapScore<OsuHitcounts>, mode: SimulationMode) -> Self {
        let combo = if score.is_full_combo() {
            None
        } else {
            Some(score.max_combo())
        };

        Self {
            mode,
            beatmap_id: score.base_beatmap().id,
            mods: score.mods().iter().map(|m| m.acronym().to_string()).collect(),
            combo,
            params: simulation_params(score.mods()),
            hitcounts: *score.hitcounts(),
            map_progress: score.map_progress(),
            accuracy: score.accuracy(),
        }
    }

    fn request(&self, combo: Option<u32>, misses: u32, mehs: u32, goods: u32) -> SimulationRequest {
        SimulationRequest {
            beatmap_id: self.beatmap_id,
            ruleset: OsuHitcounts::RULESET,
            mods: self.mods.clone(),
            combo,
            misses,
            mehs,
            goods,
            params: self.params.clone(),
        }
    }

    /// A zero-miss, zero-meh, zero-ok play at full combo
    fn perfect_request(&self) -> SimulationRequest {
        self.request(None, 0, 0, 0)
    }

    /// Count extrapolated to the whole map
    fn scaled(&self, count: u32) -> u32 {
        (f64::from(count) / self.map_progress).round() as u32
    }

    fn direct_request(&self) -> SimulationRequest {
        self.request(
            self.combo,
            self.scaled(self.hitcounts.miss()),
            self.scaled(self.hitcounts.meh()),
            self.scaled(self.hitcounts.ok()),
        )
    }
}

/// Mod settings worth forwarding: only mods whose settings differ from the defaults
fn simulation_params(mods: &[GameMod]) -> SimulationParams {
    let mut params = SimulationParams::default();
    for game_mod in mods.iter().filter(|m| !m.is_default()) {
        match game_mod.kind() {
            ModKind::DoubleTime(_) | ModKind::Nightcore(_) => {
                params.dt_rate = game_mod.kind().speed_change();
            }
            ModKind::HalfTime(_) | ModKind::Daycore(_) => {
                params.ht_rate = game_mod.kind().speed_change();
            }
            ModKind::DifficultyAdjust(settings) => {
                params.difficulty_adjust = Some(DifficultyAdjustParams {
                    ar: settings.approach_rate,
                    cs: settings.circle_size,
                    od: settings.overall_difficulty,
                    hp: settings.drain_rate,
                });
            }
            _ => {}
        }
    }
    params
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn known_total_hits(cache: &Mutex<HashMap<u32, u32>>, beatmap_id: u32) -> Option<u32> {
    lock(cache).get(&beatmap_id).copied()
}

/// Remember the total hit count of a perfect simulation
fn record_total_hits(
    cache: &Mutex<HashMap<u32, u32>>,
    beatmap_id: u32,
    result: &SimulationResult,
) -> Option<u32> {
    let total = result.total_hits(&OsuHitcounts::NAMES);
    if total == 0 {
        tracing::debug!("Simulation of beatmap {} reported no hits", beatmap_id);
        return None;
    }
    lock(cache).insert(beatmap_id, total);
    tracing::debug!("Learned {} total hits for beatmap {}", total, beatmap_id);
    Some(total)
}

async fn run_simulation(
    plan: SimulationPlan,
    dao: Arc<dyn ScoreSimulationDao>,
    total_hits: Arc<Mutex<HashMap<u32, u32>>>,
) -> Option<Arc<SimulationResult>> {
    let request = match plan.mode {
        SimulationMode::Direct => plan.direct_request(),
        SimulationMode::Accuracy if plan.accuracy >= 100.0 => {
            let result = dao.simulate(&plan.perfect_request()).await?;
            record_total_hits(&total_hits, plan.beatmap_id, &result);
            return Some(Arc::new(result));
        }
        SimulationMode::Accuracy => {
            let total = match known_total_hits(&total_hits, plan.beatmap_id) {
                Some(total) => total,
                None => {
                    let perfect = dao.simulate(&plan.perfect_request()).await?;
                    record_total_hits(&total_hits, plan.beatmap_id, &perfect)?
                }
            };

            let misses = plan.scaled(plan.hitcounts.miss());
            let mehs = plan.scaled(plan.hitcounts.meh());
            let Some(split) = solve_accuracy_split(total, misses, mehs, plan.accuracy / 100.0)
            else {
                tracing::debug!(
                    "Accuracy {:.2}% is unreachable on beatmap {} ({} hits, {} misses, {} 50s)",
                    plan.accuracy,
                    plan.beatmap_id,
                    total,
                    misses,
                    mehs
                );
                return None;
            };

            plan.request(plan.combo, split.count_miss, split.count50, split.count100)
        }
    };

    dao.simulate(&request).await.map(Arc::new)
}

/// Star rating and pp estimation for osu! scores through a [`ScoreSimulationDao`].
///
/// Share one instance per process; its caches only deduplicate calls made
/// through the same instance.
pub struct ScoreSimEstimationProvider {
    dao: Arc<dyn ScoreSimulationDao>,
    mode: SimulationMode,
    simulations: Mutex<SimulationCache<SharedSimulation>>,
    total_hits: Arc<Mutex<HashMap<u32, u32>>>,
}

impl ScoreSimEstimationProvider {
    pub fn new(dao: Arc<dyn ScoreSimulationDao>, mode: SimulationMode) -> Self {
        Self::with_policy(dao, mode, CachePolicy::default())
    }

    pub fn with_policy(
        dao: Arc<dyn ScoreSimulationDao>,
        mode: SimulationMode,
        policy: CachePolicy,
    ) -> Self {
        Self {
            dao,
            mode,
            simulations: Mutex::new(SimulationCache::new(policy)),
            total_hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(dao: Arc<dyn ScoreSimulationDao>, config: &EstimationConfig) -> Self {
        Self::with_policy(
            dao,
            SimulationMode::from_use_accuracy(config.use_accuracy),
            config.cache_policy(),
        )
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    /// Number of scores with a cached (pending or finished) simulation
    pub fn cached_simulations(&self) -> usize {
        lock(&self.simulations).len()
    }

    /// Total hit count learned for a beatmap, if any
    pub fn known_total_hits(&self, beatmap_id: u32) -> Option<u32> {
        known_total_hits(&self.total_hits, beatmap_id)
    }

    /// Simulate a score, reusing the cached simulation for the same score
    pub async fn simulate_score(
        &self,
        score: &BeatmapScore<OsuHitcounts>,
    ) -> Option<Arc<SimulationResult>> {
        self.simulation(score).await
    }

    fn simulation(&self, score: &BeatmapScore<OsuHitcounts>) -> SharedSimulation {
        let handle = score.handle();
        let mut cache = lock(&self.simulations);
        if let Some(pending) = cache.get(handle) {
            tracing::debug!("Simulation cache hit for score {}", handle);
            return pending.clone();
        }

        tracing::debug!("Simulation cache miss for score {}", handle);
        let plan = SimulationPlan::from_score(score, self.mode);
        let pending = run_simulation(plan, Arc::clone(&self.dao), Arc::clone(&self.total_hits))
            .boxed()
            .shared();
        cache.insert(handle, pending.clone());
        pending
    }
}

impl fmt::Debug for ScoreSimEstimationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreSimEstimationProvider")
            .field("mode", &self.mode)
            .field("cached_simulations", &self.cached_simulations())
            .field("known_beatmaps", &lock(&self.total_hits).len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StarRatingEstimationProvider<OsuHitcounts> for ScoreSimEstimationProvider {
    async fn get_estimation(&self, score: &BeatmapScore<OsuHitcounts>) -> Option<f64> {
        self.simulate_score(score).await?.star_rating()
    }
}

#[async_trait]
impl PpEstimationProvider<OsuHitcounts> for ScoreSimEstimationProvider {
    async fn get_estimation(&self, score: &BeatmapScore<OsuHitcounts>) -> Option<f64> {
        self.simulate_score(score).await?.pp()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::beatmap::tests::sample_beatmap;
    use crate::beatmap::{Beatmap, BeatmapOverrides};
    use crate::estimation::EstimationProviders;
    use crate::mods::RawMod;
    use crate::score::tests::sample_info;
    use crate::score::ScoreInfo;
    use crate::simulation::{DifficultyAttributes, PerformanceAttributes, SimulatedScore};
    use crate::Ruleset;

    /// Pretends every beatmap has `total_hits` objects
    struct StubDao {
        total_hits: u32,
        fail: bool,
        calls: AtomicUsize,
        requests: Mutex<Vec<SimulationRequest>>,
    }

    impl StubDao {
        fn new(total_hits: u32) -> Self {
            Self {
                total_hits,
                fail: false,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(0)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn requests(&self) -> Vec<SimulationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScoreSimulationDao for StubDao {
        async fn simulate(&self, request: &SimulationRequest) -> Option<SimulationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            tokio::task::yield_now().await;
            if self.fail {
                return None;
            }

            let used = request.misses + request.mehs + request.goods;
            let statistics = BTreeMap::from([
                ("great".to_string(), self.total_hits.saturating_sub(used)),
                ("ok".to_string(), request.goods),
                ("meh".to_string(), request.mehs),
                ("miss".to_string(), request.misses),
            ]);
            Some(SimulationResult {
                score: SimulatedScore {
                    accuracy: None,
                    combo: request.combo,
                    statistics,
                },
                performance_attributes: PerformanceAttributes {
                    pp: Some(400.0 - f64::from(request.goods)),
                },
                difficulty_attributes: DifficultyAttributes {
                    star_rating: Some(6.0),
                    max_combo: Some(800),
                },
            })
        }
    }

    fn provider(dao: &Arc<StubDao>, mode: SimulationMode) -> Arc<ScoreSimEstimationProvider> {
        Arc::new(ScoreSimEstimationProvider::new(dao.clone(), mode))
    }

    fn score_with(
        provider: &Arc<ScoreSimEstimationProvider>,
        beatmap: Beatmap,
        info: ScoreInfo<OsuHitcounts>,
    ) -> BeatmapScore<OsuHitcounts> {
        BeatmapScore::new(info, beatmap, EstimationProviders::from_shared(provider.clone()))
            .unwrap()
    }

    fn score(
        provider: &Arc<ScoreSimEstimationProvider>,
        hitcounts: OsuHitcounts,
        accuracy: f64,
    ) -> BeatmapScore<OsuHitcounts> {
        let mut info = sample_info(hitcounts);
        info.accuracy = accuracy;
        score_with(provider, sample_beatmap(), info)
    }

    #[test]
    fn test_solve_split_without_misses() {
        let split = solve_accuracy_split(1000, 0, 0, 0.98).unwrap();
        assert_eq!(split.count300, 970);
        assert_eq!(split.count100, 30);

        for step in 1..100 {
            let accuracy = f64::from(step) / 100.0;
            if let Some(split) = solve_accuracy_split(500, 0, 0, accuracy) {
                assert!(split.count300 <= 500);
                assert_eq!(split.count100, 500 - split.count300);
            }
        }
    }

    #[test]
    fn test_solve_split_respects_misses_and_mehs() {
        let split = solve_accuracy_split(1000, 5, 10, 0.95).unwrap();
        assert_eq!(split.count_miss, 5);
        assert_eq!(split.count50, 10);
        assert_eq!(split.count300 + split.count100, 985);

        let achieved = (6.0 * f64::from(split.count300)
            + 2.0 * f64::from(split.count100)
            + f64::from(split.count50))
            / 6000.0;
        assert!((achieved - 0.95).abs() < 0.001);
    }

    #[test]
    fn test_solve_split_infeasible() {
        // A single object cannot give 99.99%
        assert_eq!(solve_accuracy_split(1, 0, 0, 0.9999), None);
        // Too many misses for the requested accuracy
        assert_eq!(solve_accuracy_split(10, 10, 0, 0.5), None);
        assert_eq!(solve_accuracy_split(10, 5, 0, 0.95), None);
        // More misses than objects
        assert_eq!(solve_accuracy_split(10, 8, 4, 0.1), None);
        assert_eq!(solve_accuracy_split(0, 0, 0, 0.5), None);
        assert_eq!(solve_accuracy_split(100, 0, 0, f64::NAN), None);
    }

    #[test]
    fn test_solve_split_perfect() {
        let split = solve_accuracy_split(300, 0, 0, 1.0).unwrap();
        assert_eq!(split.count300, 300);
        assert_eq!(split.count100, 0);
    }

    #[test]
    fn test_simulation_params_only_for_changed_settings() {
        let dt = GameMod::new(Ruleset::Osu, "DT").unwrap();
        let hd = GameMod::new(Ruleset::Osu, "HD").unwrap();
        assert!(simulation_params(&[dt, hd]).is_empty());

        let fast = GameMod::from_raw(
            Ruleset::Osu,
            &RawMod::new("NC").with_setting("speed_change", 1.25),
        )
        .unwrap();
        let slow = GameMod::from_raw(
            Ruleset::Osu,
            &RawMod::new("HT").with_setting("speed_change", 0.8),
        )
        .unwrap();
        let da = GameMod::from_raw(
            Ruleset::Osu,
            &RawMod::new("DA").with_setting("circle_size", 5.0),
        )
        .unwrap();

        let params = simulation_params(&[fast, slow, da]);
        assert_eq!(params.dt_rate, Some(1.25));
        assert_eq!(params.ht_rate, Some(0.8));
        assert_eq!(
            params.difficulty_adjust,
            Some(DifficultyAdjustParams {
                cs: Some(5.0),
                ..Default::default()
            })
        );
    }

    #[tokio::test]
    async fn test_direct_request_shape() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Direct);

        let mut info = sample_info(OsuHitcounts::new(700, 20, 3, 2));
        info.mods = vec![
            GameMod::new(Ruleset::Osu, "HD").unwrap(),
            GameMod::new(Ruleset::Osu, "DT").unwrap(),
        ];
        info.max_combo = 500;
        let score = score_with(&provider, sample_beatmap(), info);

        assert_eq!(score.get_estimated_pp().await, Some(380.0));
        let request = &dao.requests()[0];
        assert_eq!(request.beatmap_id, 100);
        assert_eq!(request.mods, vec!["HD".to_string(), "DT".to_string()]);
        assert_eq!(request.combo, Some(500));
        assert_eq!((request.misses, request.mehs, request.goods), (2, 3, 20));
        assert!(request.params.is_empty());
    }

    #[tokio::test]
    async fn test_full_combo_sends_no_combo() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Direct);
        let score = score(&provider, OsuHitcounts::new(780, 20, 0, 0), 98.3);
        assert!(score.is_full_combo());

        score.get_estimated_pp().await;
        assert_eq!(dao.requests()[0].combo, None);
    }

    #[tokio::test]
    async fn test_direct_mode_extrapolates_partial_play() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Direct);

        let mut info = sample_info(OsuHitcounts::new(300, 10, 3, 1));
        info.map_progress = 0.3;
        info.passed = false;
        let score = score_with(&provider, sample_beatmap(), info);

        score.get_estimated_pp().await;
        let request = &dao.requests()[0];
        // 1 / 0.3 = 3.33, 3 / 0.3 = 10, 10 / 0.3 = 33.33
        assert_eq!((request.misses, request.mehs, request.goods), (3, 10, 33));
    }

    #[tokio::test]
    async fn test_pp_simulated_once_per_score() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Direct);
        let score = score(&provider, OsuHitcounts::new(780, 20, 0, 0), 98.3);

        assert!(score.get_estimated_pp().await.is_some());
        assert!(score.get_estimated_pp().await.is_some());
        assert_eq!(dao.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_estimates_share_one_simulation() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Direct);
        let mut info = sample_info(OsuHitcounts::new(780, 20, 0, 0));
        info.mods = vec![GameMod::new(Ruleset::Osu, "HR").unwrap()];
        let score = score_with(&provider, sample_beatmap(), info);

        let (star_rating, pp, again) = tokio::join!(
            score.get_estimated_star_rating(),
            score.get_estimated_pp(),
            provider.simulate_score(&score)
        );
        assert_eq!(star_rating, Some(6.0));
        assert_eq!(pp, Some(380.0));
        assert!(again.is_some());
        assert_eq!(dao.calls(), 1);
        assert_eq!(provider.cached_simulations(), 1);
    }

    #[tokio::test]
    async fn test_identical_scores_are_cached_separately() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Direct);
        let a = score(&provider, OsuHitcounts::new(780, 20, 0, 0), 98.3);
        let b = score(&provider, OsuHitcounts::new(780, 20, 0, 0), 98.3);

        a.get_estimated_pp().await;
        b.get_estimated_pp().await;
        assert_eq!(dao.calls(), 2);
        assert_eq!(provider.cached_simulations(), 2);
    }

    #[tokio::test]
    async fn test_failed_simulation_is_not_retried() {
        let dao = Arc::new(StubDao::failing());
        let provider = provider(&dao, SimulationMode::Direct);
        let score = score(&provider, OsuHitcounts::new(780, 20, 0, 0), 98.3);

        assert_eq!(provider.simulate_score(&score).await, None);
        assert_eq!(provider.simulate_score(&score).await, None);
        assert_eq!(score.get_estimated_pp().await, None);
        assert_eq!(dao.calls(), 1);
    }

    #[tokio::test]
    async fn test_accuracy_mode_perfect_score_records_total_hits() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Accuracy);
        let score = score(&provider, OsuHitcounts::new(1000, 0, 0, 0), 100.0);

        assert_eq!(provider.known_total_hits(100), None);
        assert_eq!(score.get_estimated_pp().await, Some(400.0));

        let requests = dao.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            (requests[0].misses, requests[0].mehs, requests[0].goods),
            (0, 0, 0)
        );
        assert_eq!(provider.known_total_hits(100), Some(1000));
    }

    #[tokio::test]
    async fn test_accuracy_mode_learns_then_reuses_total_hits() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Accuracy);

        let first = score(&provider, OsuHitcounts::new(970, 30, 0, 0), 98.0);
        assert_eq!(first.get_estimated_pp().await, Some(370.0));
        let requests = dao.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].goods, 0);
        assert_eq!(requests[0].combo, None);
        assert_eq!(
            (requests[1].misses, requests[1].mehs, requests[1].goods),
            (0, 0, 30)
        );
        assert_eq!(provider.known_total_hits(100), Some(1000));

        let second = score(&provider, OsuHitcounts::new(940, 60, 0, 0), 96.0);
        second.get_estimated_pp().await;
        let requests = dao.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].goods, 60);
    }

    #[tokio::test]
    async fn test_accuracy_mode_extrapolates_partial_play() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = provider(&dao, SimulationMode::Accuracy);

        let mut info = sample_info(OsuHitcounts::new(480, 13, 4, 3));
        info.map_progress = 0.5;
        info.passed = false;
        info.max_combo = 300;
        info.accuracy = 95.0;
        let score = score_with(&provider, sample_beatmap(), info);

        assert!(score.get_estimated_pp().await.is_some());
        let requests = dao.requests();
        assert_eq!(requests.len(), 2);

        // Misses and 50s doubled before solving: 986 hits left for 300s and 100s
        let expected = solve_accuracy_split(1000, 6, 8, 0.95).unwrap();
        assert_eq!((expected.count300, expected.count100), (930, 56));

        let request = &requests[1];
        assert_eq!((request.misses, request.mehs), (6, 8));
        assert_eq!(request.goods, expected.count100);
        assert_eq!(request.combo, Some(300));
    }

    #[tokio::test]
    async fn test_accuracy_mode_infeasible_returns_none() {
        let dao = Arc::new(StubDao::new(1));
        let provider = provider(&dao, SimulationMode::Accuracy);
        let one_object = sample_beatmap().copy(
            BeatmapOverrides::new()
                .with_id(7)
                .with_max_combo(Some(1)),
        );
        let mut info = sample_info(OsuHitcounts::new(1, 0, 0, 0));
        info.accuracy = 99.99;
        info.max_combo = 1;
        let score = score_with(&provider, one_object, info);

        assert_eq!(score.get_estimated_pp().await, None);
        // Only the perfect play used to learn the object count
        assert_eq!(dao.calls(), 1);
        assert_eq!(provider.known_total_hits(7), Some(1));
    }

    #[tokio::test]
    async fn test_accuracy_mode_gives_up_when_totals_unknown() {
        let dao = Arc::new(StubDao::failing());
        let provider = provider(&dao, SimulationMode::Accuracy);
        let score = score(&provider, OsuHitcounts::new(970, 30, 0, 0), 98.0);

        assert_eq!(score.get_estimated_pp().await, None);
        assert_eq!(provider.known_total_hits(100), None);
    }

    #[tokio::test]
    async fn test_provider_cache_is_bounded() {
        let dao = Arc::new(StubDao::new(1000));
        let provider = Arc::new(ScoreSimEstimationProvider::with_policy(
            dao.clone(),
            SimulationMode::Direct,
            CachePolicy {
                capacity: 3,
                eviction_batch: 2,
            },
        ));

        let scores: Vec<_> = (0..4)
            .map(|_| score(&provider, OsuHitcounts::new(780, 20, 0, 0), 98.3))
            .collect();
        for score in &scores {
            provider.simulate_score(score).await;
        }
        assert_eq!(provider.cached_simulations(), 2);

        // Evicted scores simulate again, cached ones do not
        provider.simulate_score(&scores[3]).await;
        assert_eq!(dao.calls(), 4);
        provider.simulate_score(&scores[0]).await;
        assert_eq!(dao.calls(), 5);
    }

    #[test]
    fn test_from_config() {
        let dao: Arc<dyn ScoreSimulationDao> = Arc::new(StubDao::new(10));
        let config = EstimationConfig {
            use_accuracy: true,
            ..Default::default()
        };
        let provider = ScoreSimEstimationProvider::from_config(dao, &config);
        assert_eq!(provider.mode(), SimulationMode::Accuracy);
        assert_eq!(provider.cached_simulations(), 0);
    }
}
