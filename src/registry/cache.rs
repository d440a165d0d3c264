// src/registry/cache.rs
// =============================================================================
// The model registry service: fetch -> parse -> cache.
//
// ModelCache owns the content source and a single cache slot. The slot is
// keyed by the active repo coordinates and expires after five minutes; the
// expiry is checked when someone asks, there is no background timer.
//
// Locking:
// - The slot sits behind one std Mutex, held only to read or replace it
// - The lock is never held across the network call, so two concurrent
//   misses may both fetch; the last one to finish wins the slot
// - Readers get a clone of the records, never a reference into the cache
//
// Rust concepts:
// - Generics: ModelCache<S> works with any ContentSource
// - Instant/Duration: monotonic clock for the time-to-live check
// =============================================================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::model::ModelRecord;
use super::parser::parse_models;
use crate::error::{RegistryError, Result};
use crate::github::ContentSource;
use crate::repo::RepoStore;

// How long a parsed model list stays valid (five minutes)
pub const CACHE_TTL: Duration = Duration::from_secs(300);

// What the cache slot holds
struct CacheEntry {
    // Already normalized, exactly as parse_models returned them
    records: Vec<ModelRecord>,
    // When the fetch finished (monotonic, unaffected by clock changes)
    fetched_at: Instant,
    // "owner/repo/branch/path" of the coordinates that produced `records`
    cache_key: String,
}

impl CacheEntry {
    // An entry is only usable for the same coordinates, and only until
    // the TTL runs out
    fn is_fresh_for(&self, key: &str, ttl: Duration) -> bool {
        self.cache_key == key && self.fetched_at.elapsed() < ttl
    }
}

// The registry service
//
// Built once in main.rs and shared by every command:
//   store: the active repo coordinates (shared with the fetcher)
//   source: where file bytes come from (GitHub in production)
//   ttl: CACHE_TTL, except in tests
//   entry: the single cache slot
pub struct ModelCache<S> {
    store: Arc<RepoStore>,
    source: S,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl<S: ContentSource> ModelCache<S> {
    pub fn new(store: Arc<RepoStore>, source: S) -> Self {
        Self {
            store,
            source,
            ttl: CACHE_TTL,
            entry: Mutex::new(None),
        }
    }

    // Raw bytes of any file in the active repository
    //
    // Never cached: scripts and model cards are fetched on every call.
    pub async fn fetch_file_content(&self, token: &str, path: &str) -> Result<Vec<u8>> {
        // No active coordinates means nothing is fetched
        if !self.store.is_configured() {
            return Err(RegistryError::NotConfigured);
        }
        self.source.fetch(token, path).await
    }

    // The parsed model list for the active repository
    //
    // Served from the cache when the entry matches the current coordinates
    // and is younger than the TTL, unless `refresh` is set.
    //
    // Returns: a fresh copy of the records on every call
    pub async fn get_models(&self, token: &str, refresh: bool) -> Result<Vec<ModelRecord>> {
        // Snapshot the coordinates once, so the key and the fetched path
        // always agree even if someone calls store.set() meanwhile
        let coords = self.store.get().ok_or(RegistryError::NotConfigured)?;
        let key = coords.cache_key();

        // Step 1: try the cache
        if !refresh {
            if let Some(records) = self.cached(&key) {
                debug!(cache_key = %key, count = records.len(), "model cache hit");
                return Ok(records);
            }
        }
        debug!(cache_key = %key, refresh, "model cache miss");

        // Step 2: fetch and parse
        // No lock held from here until the result is stored
        let content = self.source.fetch(token, &coords.config_path).await?;
        let records = parse_models(&content, &coords.config_path)?;

        // Step 3: remember the result (errors above never reach this point,
        // so a failed fetch or parse leaves the slot as it was)
        info!(cache_key = %key, count = records.len(), "loaded models from GitHub");
        self.store_entry(key, records.clone());
        Ok(records)
    }

    // Drops the cached entry, whatever its key
    pub fn invalidate(&self) {
        debug!("model cache invalidated");
        *self.lock() = None;
    }

    // Forces a fresh fetch and returns how many models were found
    // Used to check new coordinates before relying on them
    pub async fn test_connection(&self, token: &str) -> Result<usize> {
        self.invalidate();
        let records = self.get_models(token, true).await?;
        Ok(records.len())
    }

    // Clone of the cached records if the entry is usable for `key`
    fn cached(&self, key: &str) -> Option<Vec<ModelRecord>> {
        let slot = self.lock();
        slot.as_ref()
            .filter(|entry| entry.is_fresh_for(key, self.ttl))
            .map(|entry| entry.records.clone())
    }

    // Replaces the slot; the previous entry (any key) is dropped
    fn store_entry(&self, cache_key: String, records: Vec<ModelRecord>) {
        *self.lock() = Some(CacheEntry {
            records,
            fetched_at: Instant::now(),
            cache_key,
        });
    }

    // The slot is only ever replaced whole, so recovering from a poisoned
    // lock cannot expose a half-written entry
    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl<S> ModelCache<S> {
    fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why clone the records on every read?
//    - The caller gets its own Vec it can sort, filter, or mutate
//    - The cached copy stays exactly as parsed
//
// 2. What is `impl<S: ContentSource> ModelCache<S>`?
//    - Methods that only exist when S implements ContentSource
//    - main.rs uses ModelCache<ContentFetcher>, tests use a fake source
//
// 3. Why a std::sync::Mutex and not tokio::sync::Mutex?
//    - We never .await while holding the lock
//    - A std Mutex is cheaper and fine for short critical sections
//
// 4. What does `.filter(...).map(...)` on an Option do?
//    - filter turns Some(entry) into None if the predicate fails
//    - map clones the records out of whatever is left
// -----------------------------------------------------------------------------
