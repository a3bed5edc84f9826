//! Cache for the latest-release lookup
//!
//! The web path serves many concurrent requests from one release lookup. The
//! cache holds a single entry that is only ever replaced as a whole, so readers
//! see either the previous entry or the new one.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::github::ReleaseInfo;

/// A cached release together with the time it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub release: Arc<ReleaseInfo>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn new(release: Arc<ReleaseInfo>) -> Self {
        Self {
            release,
            fetched_at: Instant::now(),
        }
    }
}

/// Storage for the most recent release lookup.
pub trait ReleaseCache: Send + Sync {
    fn get(&self) -> Option<CacheEntry>;

    /// Replace the stored entry.
    fn put(&self, entry: CacheEntry);

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool;

    /// The cached release if it is still fresh at `now`.
    fn fresh(&self, now: Instant) -> Option<Arc<ReleaseInfo>> {
        self.get()
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.release)
    }
}

/// Process-wide in-memory cache with a fixed time to live
#[derive(Debug)]
pub struct MemoryReleaseCache {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl MemoryReleaseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl ReleaseCache for MemoryReleaseCache {
    fn get(&self) -> Option<CacheEntry> {
        match self.entry.read() {
            Ok(guard) => guard.clone(),
            // a poisoned lock still holds a whole entry
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn put(&self, entry: CacheEntry) {
        match self.entry.write() {
            Ok(mut guard) => *guard = Some(entry),
            Err(poisoned) => *poisoned.into_inner() = Some(entry),
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.fetched_at) >= self.ttl
    }
}
