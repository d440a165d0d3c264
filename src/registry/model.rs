// src/registry/model.rs
// =============================================================================
// The records that make up the model registry.
//
// A config file is a list of ModelRecord entries. Each record may carry
// metrics, links to files in the repo, and a version history where every
// version lists the datasets it was trained on.
//
// Field names on the wire are camelCase (`createdAt`, `filePath`, ...).
// Unknown fields are ignored. Optional fields stay None when absent so an
// empty `description: ""` is still distinguishable from no description.
//
// Rust concepts:
// - serde attributes: rename_all, default, deserialize_with
// - Option<T>: fields that may be missing from the config
// =============================================================================

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::coerce;

// Lifecycle stage of a model
// Anything unrecognised (wrong case, typos, empty) reads as Development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    #[default]
    Development,
    Staging,
    Production,
    Archived,
}

impl ModelStatus {
    // The wire form, also used for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Development => "development",
            ModelStatus::Staging => "staging",
            ModelStatus::Production => "production",
            ModelStatus::Archived => "archived",
        }
    }

    // Exact, case-sensitive match; everything else (including "") is
    // Development
    pub fn from_loose(value: &str) -> Self {
        match value {
            "staging" => ModelStatus::Staging,
            "production" => ModelStatus::Production,
            "archived" => ModelStatus::Archived,
            _ => ModelStatus::Development,
        }
    }
}

// Display is the same lowercase word as the wire form
impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so table columns like {:<12} line up
        f.pad(self.as_str())
    }
}

// Hand-written instead of derived: a derived impl would reject unknown
// values, we map them to Development
impl<'de> Deserialize<'de> for ModelStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Numbers/booleans/null become text first ("" -> Development)
        let raw = coerce::string(deserializer)?;
        Ok(ModelStatus::from_loose(&raw))
    }
}

// Headline numbers for a model; both are optional and free-form
// (accuracy as a fraction, latency in milliseconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
}

// Paths (relative to the repo root) of files that belong to a model
// Each one can be printed with the `file` subcommand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFiles {
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub model_card: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub training_script: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub feature_script: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub inference_script: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub model_file: Option<String>,
}

impl ModelFiles {
    // (label, path) for every file that is set, in display order
    // Used by `show` to list a model's files
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("model card", &self.model_card),
            ("training script", &self.training_script),
            ("feature script", &self.feature_script),
            ("inference script", &self.inference_script),
            ("model file", &self.model_file),
        ]
        .into_iter()
        .filter_map(|(label, path)| path.as_deref().map(|p| (label, p)))
        .collect()
    }
}

// A dataset a model version was trained on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, deserialize_with = "coerce::string")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub file_path: String,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_string_list", skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, deserialize_with = "coerce::string")]
    pub added_at: String,
}

// One entry of a model's version history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
    #[serde(default, deserialize_with = "coerce::string")]
    pub version: String,
    // `datasets: null` and a missing key both give an empty list
    #[serde(default, deserialize_with = "coerce::null_as_default")]
    pub datasets: Vec<Dataset>,
    #[serde(default, deserialize_with = "coerce::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// One entry of the model registry
//
// After normalization the eight required fields (seven strings plus status)
// are never empty. The remaining fields are None when the config omits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    #[serde(default, deserialize_with = "coerce::string")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub version: String,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::string")]
    pub framework: String,
    // Unknown values were already mapped to Development while decoding
    #[serde(default)]
    pub status: ModelStatus,
    #[serde(default, deserialize_with = "coerce::string")]
    pub owner: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<ModelFiles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<ModelVersion>>,
}

impl ModelRecord {
    // Fills every required-but-empty field with its default.
    // `index` is the record's position in the config file.
    //
    // Status needs no work here: ModelStatus can only hold a valid value.
    pub fn normalize(&mut self, index: usize) {
        // The id default depends on the position: model-0, model-1, ...
        if self.id.is_empty() {
            self.id = format!("model-{}", index);
        }
        fill_if_empty(&mut self.name, "Unnamed Model");
        fill_if_empty(&mut self.version, "Unknown");
        fill_if_empty(&mut self.framework, "Unknown");
        fill_if_empty(&mut self.owner, "Unknown");
        fill_if_empty(&mut self.created_at, "Unknown");
        fill_if_empty(&mut self.updated_at, "Unknown");
    }
}

// Replaces "" with `fallback`; anything else is left untouched
fn fill_if_empty(field: &mut String, fallback: &str) {
    if field.is_empty() {
        *field = fallback.to_string();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `#[serde(default)]` on a field do?
//    - A missing key gives the type's Default (an empty String, None, ...)
//    - normalize() then replaces empty required strings with real defaults
//
// 2. What is `deserialize_with = "coerce::string"`?
//    - serde calls our function instead of String's own Deserialize
//    - That is how `version: 2` ends up as the string "2"
//
// 3. Why `skip_serializing_if = "Option::is_none"`?
//    - `--json` output leaves absent fields out instead of writing null
// -----------------------------------------------------------------------------
