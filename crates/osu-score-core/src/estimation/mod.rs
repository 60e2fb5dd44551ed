//! Star rating and pp estimation capabilities
//!
//! Every ruleset supplies both a [`StarRatingEstimationProvider`] and a
//! [`PpEstimationProvider`]. Rulesets without a simulation backend use
//! [`UnsupportedEstimationProvider`], which never produces an estimate.

mod cache;
mod score_sim;

pub use cache::*;
pub use score_sim::*;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::score::{BeatmapScore, Hitcounts};

/// Estimates the star rating of a score's modded beatmap
#[async_trait]
pub trait StarRatingEstimationProvider<H: Hitcounts>: Send + Sync {
    /// `None` when the estimate is unavailable (simulation failed or inputs insufficient)
    async fn get_estimation(&self, score: &BeatmapScore<H>) -> Option<f64>;
}

/// Estimates the performance points of a score
#[async_trait]
pub trait PpEstimationProvider<H: Hitcounts>: Send + Sync {
    /// `None` when the estimate is unavailable (simulation failed or inputs insufficient)
    async fn get_estimation(&self, score: &BeatmapScore<H>) -> Option<f64>;
}

/// The pair of providers injected into every [`BeatmapScore`]
pub struct EstimationProviders<H: Hitcounts> {
    pub star_rating: Arc<dyn StarRatingEstimationProvider<H>>,
    pub pp: Arc<dyn PpEstimationProvider<H>>,
}

impl<H: Hitcounts> EstimationProviders<H> {
    pub fn new(
        star_rating: Arc<dyn StarRatingEstimationProvider<H>>,
        pp: Arc<dyn PpEstimationProvider<H>>,
    ) -> Self {
        Self { star_rating, pp }
    }

    /// Providers that never estimate anything
    pub fn unsupported() -> Self {
        Self::from_shared(Arc::new(UnsupportedEstimationProvider))
    }

    /// Use one provider instance for both capabilities so they share its caches
    pub fn from_shared<P>(provider: Arc<P>) -> Self
    where
        P: StarRatingEstimationProvider<H> + PpEstimationProvider<H> + 'static,
    {
        Self {
            star_rating: provider.clone(),
            pp: provider,
        }
    }
}

impl<H: Hitcounts> Clone for EstimationProviders<H> {
    fn clone(&self) -> Self {
        Self {
            star_rating: Arc::clone(&self.star_rating),
            pp: Arc::clone(&self.pp),
        }
    }
}

impl<H: Hitcounts> fmt::Debug for EstimationProviders<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EstimationProviders")
            .field("ruleset", &H::RULESET)
            .finish_non_exhaustive()
    }
}

/// Degraded mode for rulesets without a simulation backend
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedEstimationProvider;

#[async_trait]
impl<H: Hitcounts> StarRatingEstimationProvider<H> for UnsupportedEstimationProvider {
    async fn get_estimation(&self, _score: &BeatmapScore<H>) -> Option<f64> {
        None
    }
}

#[async_trait]
impl<H: Hitcounts> PpEstimationProvider<H> for UnsupportedEstimationProvider {
    async fn get_estimation(&self, _score: &BeatmapScore<H>) -> Option<f64> {
        None
    }
}
