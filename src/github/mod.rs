// src/github/mod.rs
// =============================================================================
// This module handles fetching files from a GitHub repository.
//
// Currently implements:
// - The "get file contents" call against GitHub's REST API
// - base64 decoding of the returned payload
// - Mapping GitHub's HTTP failures onto RegistryError variants
//
// The ContentSource trait is the seam between the cache and the network:
// production code plugs in ContentFetcher, tests plug in a fake.
// =============================================================================

mod fetch;

pub use fetch::{ContentFetcher, ContentSource, DEFAULT_API_URL};
