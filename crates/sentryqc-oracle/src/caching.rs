//! Caching decorator: an oracle response cache keyed by `(detection
//! fingerprint, call fingerprint)` with its own TTL, deliberately kept
//! disjoint from the engine's decision cache (`sentryqc-engine`) — the two
//! caches serve different questions and expire on different schedules.

use crate::client::OracleClient;
use crate::types::{OracleRequest, OracleResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use sentryqc_core::fingerprint;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry {
    response: OracleResponse,
    created_at: Instant,
}

/// Wraps any [`OracleClient`] with a response cache.
pub struct CachingOracle<T> {
    inner: Arc<T>,
    ttl: Duration,
    cache: DashMap<String, CacheEntry>,
}

impl<T> CachingOracle<T> {
    /// Wrap `inner`, caching responses for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<T>, ttl: Duration) -> Self {
        Self { inner, ttl, cache: DashMap::new() }
    }

    fn cache_key(request: &OracleRequest) -> String {
        let call_fp = fingerprint::compute(&request.tool_name, &request.tool_input);
        let detections_json = serde_json::to_vec(&request.detections).unwrap_or_default();
        let detection_fp = Sha256::digest(&detections_json);
        format!("{call_fp}:{detection_fp:x}")
    }

    /// Number of cached entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache currently holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[async_trait]
impl<T: OracleClient + 'static> OracleClient for CachingOracle<T> {
    async fn analyze(&self, request: OracleRequest, deadline: Duration) -> OracleResponse {
        let key = Self::cache_key(&request);
        if let Some(entry) = self.cache.get(&key) {
            if entry.created_at.elapsed() < self.ttl {
                return entry.response.clone();
            }
        }
        let response = self.inner.analyze(request, deadline).await;
        self.cache.insert(key, CacheEntry { response: response.clone(), created_at: Instant::now() });
        response
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
