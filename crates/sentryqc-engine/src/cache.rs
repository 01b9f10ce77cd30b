//! The fingerprint-keyed decision cache.
//!
//! A `DashMap` from [`Fingerprint`] to `(AnalysisResult, createdAt, ttl)`
//! with a soft maximum size (default 10,000). On insertion at capacity:
//! expired entries are evicted first; if still at capacity, the oldest 10%
//! by `createdAt` are evicted. `get` always returns a copy with `cached`
//! forced to `true`; the stored value itself always keeps `cached: false`.

use dashmap::DashMap;
use sentryqc_core::fingerprint::Fingerprint;
use sentryqc_core::AnalysisResult;
use std::time::{Duration, Instant};

struct Entry {
    result: AnalysisResult,
    created_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// The decision engine's fingerprint-keyed cache.
pub struct DecisionCache {
    entries: DashMap<Fingerprint, Entry>,
    max_size: usize,
}

impl DecisionCache {
    /// Construct an empty cache with the given soft size cap.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self { entries: DashMap::new(), max_size }
    }

    /// Look up `fingerprint`. Returns a clone of the stored result with
    /// `cached` forced to `true`, or `None` on a miss or an expired entry
    /// (an expired entry is treated as a miss but is not proactively
    /// removed here — the next `set` call's eviction pass will reap it).
    #[must_use]
    pub fn get(&self, fingerprint: Fingerprint) -> Option<AnalysisResult> {
        let entry = self.entries.get(&fingerprint)?;
        if entry.is_expired() {
            return None;
        }
        let mut result = entry.result.clone();
        result.cached = true;
        Some(result)
    }

    /// Insert `result` (with `cached: false`) under `fingerprint`, expiring
    /// after `ttl`. A `set` that loses a race to another `set` for the same
    /// key is observationally equivalent, since identical inputs always
    /// compute identical decisions.
    pub fn set(&self, fingerprint: Fingerprint, mut result: AnalysisResult, ttl: Duration) {
        result.cached = false;
        self.evict_if_at_capacity();
        self.entries.insert(fingerprint, Entry { result, created_at: Instant::now(), ttl });
    }

    /// Number of entries currently stored, including any not-yet-reaped
    /// expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache currently holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_if_at_capacity(&self) {
        if self.entries.len() < self.max_size {
            return;
        }
        let expired: Vec<Fingerprint> =
            self.entries.iter().filter(|e| e.value().is_expired()).map(|e| *e.key()).collect();
        for key in expired {
            self.entries.remove(&key);
        }
        if self.entries.len() < self.max_size {
            return;
        }
        let mut by_age: Vec<(Fingerprint, Instant)> =
            self.entries.iter().map(|e| (*e.key(), e.value().created_at)).collect();
        by_age.sort_by_key(|(_, created_at)| *created_at);
        let evict_count = (self.entries.len() / 10).max(1);
        for (key, _) in by_age.into_iter().take(evict_count) {
            self.entries.remove(&key);
        }
    }
}
