// src/repo/store.rs
// =============================================================================
// Holds the one active set of repository coordinates.
//
// The store is created once at startup and shared (behind an Arc) by the
// fetcher and the cache. A single Mutex guards the slot; every operation
// takes the lock briefly and never across an .await.
// =============================================================================

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::RepoCoordinates;

#[derive(Debug, Default)]
pub struct RepoStore {
    // None until `set` is called, and again after `clear`
    current: Mutex<Option<RepoCoordinates>>,
}

impl RepoStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Replaces whatever was there before
    pub fn set(&self, coords: RepoCoordinates) {
        debug!(cache_key = %coords.cache_key(), "repository coordinates set");
        *self.lock() = Some(coords);
    }

    // Snapshot of the current coordinates, or None when unset
    // The clone is the caller's own: later set() calls don't change it
    pub fn get(&self) -> Option<RepoCoordinates> {
        self.lock().clone()
    }

    // Forgets the coordinates; fetches answer NotConfigured afterwards
    pub fn clear(&self) {
        debug!("repository coordinates cleared");
        *self.lock() = None;
    }

    // True between a `set` and the next `clear`
    pub fn is_configured(&self) -> bool {
        self.lock().is_some()
    }

    // The slot is always replaced whole, so a poisoned lock still holds
    // a complete value
    fn lock(&self) -> MutexGuard<'_, Option<RepoCoordinates>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why do set/clear take &self and not &mut self?
//    - The store is shared through Arc, which only hands out & references
//    - The Mutex provides the mutation ("interior mutability")
//
// 2. What is PoisonError::into_inner?
//    - A Mutex is "poisoned" if a thread panicked while holding it
//    - into_inner ignores the poison flag and gives us the guard anyway
//
// 3. Why does get() return a clone?
//    - A reference into the Mutex would keep it locked as long as it lives
// -----------------------------------------------------------------------------
