// src/registry/mod.rs
// =============================================================================
// This module contains the model registry itself.
//
// Submodules:
// - model: ModelRecord and friends (the schema of the config file)
// - coerce: permissive decoders used by the schema
// - parser: bytes + file path -> normalized ModelRecords
// - cache: fetch, parse and cache the registry for the active repo
// =============================================================================

mod cache;
mod coerce;
mod model;
mod parser;

pub use cache::ModelCache;
pub use model::{ModelRecord, ModelStatus};
