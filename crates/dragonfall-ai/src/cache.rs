//! Fingerprint-keyed cache of past tactical decisions.
//!
//! A cache hit lets the boss reuse a tactic for a situation it has
//! already reasoned about, skipping the synthesis latency entirely.

use dragonfall_core::constants::DECISION_CACHE_CAPACITY;
use dragonfall_core::enums::BossTactic;

#[derive(Debug, Clone)]
pub struct CachedDecision {
    pub fingerprint: String,
    pub tactic: BossTactic,
    pub created_tick: u64,
    pub use_count: u32,
}

/// Bounded decision store with insertion-order eviction. Entries are
/// never invalidated; a stale tactic is still a valid tactic for the
/// situation it fingerprints.
#[derive(Debug, Clone)]
pub struct DecisionCache {
    entries: Vec<CachedDecision>,
    capacity: usize,
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new(DECISION_CACHE_CAPACITY)
    }
}

impl DecisionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Exact-match lookup. A hit increments the entry's use count.
    pub fn lookup(&mut self, fingerprint: &str) -> Option<BossTactic> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.fingerprint == fingerprint)?;
        entry.use_count += 1;
        Some(entry.tactic)
    }

    /// Store a freshly synthesized decision. Re-inserting an existing
    /// fingerprint replaces its tactic in place; otherwise the oldest
    /// entry is evicted once the cache is full.
    pub fn insert(&mut self, fingerprint: String, tactic: BossTactic, tick: u64) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.fingerprint == fingerprint)
        {
            entry.tactic = tactic;
            entry.created_tick = tick;
            return;
        }
        self.entries.push(CachedDecision {
            fingerprint,
            tactic,
            created_tick: tick,
            use_count: 0,
        });
        while self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    pub fn use_count(&self, fingerprint: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.fingerprint == fingerprint)
            .map(|e| e.use_count)
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.iter().any(|e| e.fingerprint == fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
