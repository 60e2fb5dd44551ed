//! Bounded per-score cache of simulation results

use std::collections::VecDeque;

use crate::score::ScoreHandle;

/// Default number of cached scores before eviction kicks in
pub const DEFAULT_CACHE_CAPACITY: usize = 50;
/// Default number of oldest entries dropped per eviction
pub const DEFAULT_EVICTION_BATCH: usize = 25;

/// Size limits of a [`SimulationCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub capacity: usize,
    pub eviction_batch: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            eviction_batch: DEFAULT_EVICTION_BATCH,
        }
    }
}

/// Insertion-ordered `(score, value)` list.
///
/// Once the list grows past its capacity the oldest `eviction_batch` entries
/// are dropped in one go.
#[derive(Debug)]
pub struct SimulationCache<V> {
    entries: VecDeque<(ScoreHandle, V)>,
    policy: CachePolicy,
}

impl<V> SimulationCache<V> {
    /// An eviction batch of zero would never evict; it is raised to one.
    pub fn new(policy: CachePolicy) -> Self {
        let policy = CachePolicy {
            eviction_batch: policy.eviction_batch.max(1),
            ..policy
        };
        Self {
            entries: VecDeque::with_capacity(policy.capacity + 1),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn get(&self, handle: ScoreHandle) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| *key == handle)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, handle: ScoreHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Append an entry, evicting the oldest batch when over capacity
    pub fn insert(&mut self, handle: ScoreHandle, value: V) {
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| *key == handle) {
            slot.1 = value;
            return;
        }

        self.entries.push_back((handle, value));

        if self.entries.len() > self.policy.capacity {
            let evicted = self.policy.eviction_batch.min(self.entries.len());
            self.entries.drain(..evicted);
            tracing::debug!(
                "Evicted {} simulations from cache, {} remain",
                evicted,
                self.entries.len()
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for SimulationCache<V> {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}
