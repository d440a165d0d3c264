// src/repo/mod.rs
// =============================================================================
// This module knows WHERE the model registry lives.
//
// Submodules:
// - coords: the (owner, repo, branch, config path) tuple and its defaults
// - store: a thread-safe slot holding at most one active set of coordinates
//
// Rust concepts:
// - Modules: Organizing related functionality
// - pub use: Re-export items so callers write `repo::RepoStore`
// =============================================================================

mod coords;
mod store;

pub use coords::RepoCoordinates;
pub use store::RepoStore;
