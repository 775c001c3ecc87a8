//! Transformed-document cache keyed by raw HTML.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

/// Number of documents kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 20;

/// Bounded LRU map from raw document text to its transformed output.
///
/// Entries are never invalidated by path. An edited file has different raw
/// content and therefore misses on its own; stale entries age out.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, Arc<str>>>,
    hits: AtomicU64,
}

impl ResponseCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
        }
    }

    /// Capacity of 0 is raised to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    /// Look up a document, marking it most recently used.
    pub fn get(&self, raw: &str) -> Option<Arc<str>> {
        let hit = self.entries.lock().get(raw).cloned();
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    /// Store a transformed document, evicting the least recently used one
    /// when full.
    pub fn set(&self, raw: String, transformed: Arc<str>) {
        self.entries.lock().put(raw, transformed);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Total lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
