//! In-memory price bundle cache with a fixed TTL, built on moka.
//!
//! Entries expire a fixed time after insertion regardless of how often they
//! are read. The cache is bounded, lives as long as the service that owns it
//! and is never persisted.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::models::PriceBundle;

/// Default time-to-live for cached bundles.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Default bound on distinct symbol sets kept at once.
pub const DEFAULT_MAX_CAPACITY: u64 = 1000;

/// Thread-safe TTL cache keyed by [`SymbolSet::cache_key`](crate::models::SymbolSet::cache_key).
///
/// Expired entries are never returned. They are reclaimed by moka's own
/// maintenance along with any entries evicted to stay under capacity.
pub struct QuoteCache {
    entries: Cache<String, Arc<PriceBundle>>,
    ttl: Duration,
}

impl QuoteCache {
    /// Create a cache with the default capacity.
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_capacity)
                .build(),
            ttl,
        }
    }

    /// Look up a live bundle.
    pub fn get(&self, key: &str) -> Option<Arc<PriceBundle>> {
        self.entries.get(key)
    }

    /// Insert or replace the bundle for `key`; its TTL starts now.
    pub fn set(&self, key: impl Into<String>, bundle: Arc<PriceBundle>) {
        self.entries.insert(key.into(), bundle);
    }

    /// Number of live entries, after flushing pending maintenance.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
