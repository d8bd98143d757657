//! Result cache keyed by URL hash.
//!
//! Absorbs bursty repeated requests for the same media: LRU eviction at a
//! fixed capacity plus a short TTL per entry. Lifecycle is tied to the
//! owning scheduler, never process-wide state.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::models::ScanResult;

/// Stable cache key for a URL.
pub(crate) fn key_for(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

struct CacheEntry {
    result: ScanResult,
    inserted: Instant,
    last_access: Instant,
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
}

pub(crate) struct ResultCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
            }),
            capacity,
            ttl,
        }
    }

    /// Looks up a fresh cached result. Expired entries are removed on the
    /// way out.
    pub fn get(&self, url: &str) -> Option<ScanResult> {
        let key = key_for(url);
        let mut inner = self.inner.lock().ok()?;
        let now = Instant::now();
        let expired = match inner.entries.get(&key) {
            Some(entry) => now.duration_since(entry.inserted) >= self.ttl,
            None => return None,
        };
        if expired {
            inner.entries.remove(&key);
            return None;
        }
        let entry = inner.entries.get_mut(&key)?;
        entry.last_access = now;
        Some(entry.result.clone())
    }

    /// Caches a result, evicting the least recently used entry at capacity.
    pub fn insert(&self, url: &str, result: ScanResult) {
        let key = key_for(url);
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let now = Instant::now();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let lru = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(k, _)| k.clone());
            if let Some(lru) = lru {
                inner.entries.remove(&lru);
            }
        }
        inner.entries.insert(
            key,
            CacheEntry {
                result,
                inserted: now,
                last_access: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.entries.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanStatus, Verdict};

    fn result_for(url: &str) -> ScanResult {
        ScanResult {
            url: url.to_string(),
            verdict: Verdict::Safe,
            confidence: 0.9,
            signals: Vec::new(),
            reasons: Vec::new(),
            scan_time: Duration::from_millis(10),
            bytes_downloaded: 0,
            status: ScanStatus::Complete,
            error: None,
            manifest: None,
            heuristics: None,
            loop_analysis: None,
        }
    }

    #[test]
    fn test_key_is_stable_and_distinct() {
        assert_eq!(key_for("https://a.example/x"), key_for("https://a.example/x"));
        assert_ne!(key_for("https://a.example/x"), key_for("https://a.example/y"));
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResultCache::new(4, Duration::from_secs(60));
        cache.insert("https://a.example/x", result_for("https://a.example/x"));
        let hit = cache.get("https://a.example/x").unwrap();
        assert_eq!(hit.verdict, Verdict::Safe);
        assert!(cache.get("https://a.example/other").is_none());
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = ResultCache::new(4, Duration::ZERO);
        cache.insert("https://a.example/x", result_for("https://a.example/x"));
        assert!(cache.get("https://a.example/x").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let cache = ResultCache::new(2, Duration::from_secs(60));
        cache.insert("u1", result_for("u1"));
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("u2", result_for("u2"));
        std::thread::sleep(Duration::from_millis(5));
        // Touch u1 so u2 becomes the least recently used
        assert!(cache.get("u1").is_some());
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("u3", result_for("u3"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("u2").is_none());
        assert!(cache.get("u1").is_some());
        assert!(cache.get("u3").is_some());
    }

    #[test]
    fn test_reinsert_same_url_does_not_evict() {
        let cache = ResultCache::new(2, Duration::from_secs(60));
        cache.insert("u1", result_for("u1"));
        cache.insert("u2", result_for("u2"));
        cache.insert("u1", result_for("u1"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("u2").is_some());
    }
}
