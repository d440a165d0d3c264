// src/registry/parser.rs
// =============================================================================
// Turns the raw bytes of a config file into normalized ModelRecords.
//
// How it works:
// 1. Empty input is rejected straight away
// 2. The file extension picks the decoder: .yaml/.yml -> YAML, else JSON
// 3. The document must be a list of models, or an object with a `models`
//    list inside it
// 4. Each list element is decoded into a ModelRecord on its own
// 5. Normalization fills in defaults for required fields
//
// Quirk: an empty top-level JSON list is a valid
// (empty) registry, while an empty top-level YAML list is rejected.
//
// Rust concepts:
// - serde_json::Value: a dynamically typed document we can inspect first
// - Iterator::collect into Result: stops at the first bad element
// =============================================================================

use serde_json::Value;
use tracing::debug;

use super::model::ModelRecord;
use crate::error::{RegistryError, Result};

// Parses a config file fetched from `path`
//
// Parameters:
//   content: raw bytes exactly as GitHub returned them
//   path: used only to pick the decoder (YAML or JSON)
//
// Returns: normalized records, in file order
pub fn parse_models(content: &[u8], path: &str) -> Result<Vec<ModelRecord>> {
    // Nothing to decode at all
    if content.is_empty() {
        return Err(RegistryError::EmptyConfig);
    }

    // Step 1: decode the document and find the list of models
    let items = if is_yaml_path(path) {
        yaml_items(content)?
    } else {
        json_items(content)?
    };

    // Step 2: turn each list element into a ModelRecord
    let records = decode_records(items)?;
    debug!(path, count = records.len(), "parsed model config");
    Ok(records)
}

// Case-insensitive check for a .yaml / .yml extension
// Anything else (including no extension) is treated as JSON
fn is_yaml_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml")
}

// Fills required fields of every record; `i` is the position in the file
fn normalize_models(mut records: Vec<ModelRecord>) -> Vec<ModelRecord> {
    for (i, record) in records.iter_mut().enumerate() {
        record.normalize(i);
    }
    records
}

fn json_items(content: &[u8]) -> Result<Vec<Value>> {
    // Any syntax error is reported as a shape error, the details go to the log
    let document: Value = serde_json::from_slice(content).map_err(|e| {
        debug!(error = %e, "config is not valid JSON");
        RegistryError::not_an_array()
    })?;

    match document {
        // An empty JSON list is accepted (zero models)
        Value::Array(items) => Ok(items),
        other => wrapped_items(other),
    }
}

fn yaml_items(content: &[u8]) -> Result<Vec<Value>> {
    // Decode into serde_yaml's own Value first: aliases are expanded by the
    // loader, but `<<: *anchor` merge keys are only applied on request
    let mut document: serde_yaml::Value = serde_yaml::from_slice(content).map_err(|e| {
        debug!(error = %e, "config is not valid YAML");
        RegistryError::not_an_array()
    })?;

    document.apply_merge().map_err(|e| {
        debug!(error = %e, "config has an invalid YAML merge key");
        RegistryError::not_an_array()
    })?;

    // From here on YAML and JSON documents look the same
    let document: Value = serde_yaml::from_value(document).map_err(|e| {
        debug!(error = %e, "config YAML has no JSON equivalent");
        RegistryError::not_an_array()
    })?;

    match document {
        // ...but an empty YAML list is not
        Value::Array(items) if !items.is_empty() => Ok(items),
        other => wrapped_items(other),
    }
}

// The `{"models": [...]}` form
fn wrapped_items(document: Value) -> Result<Vec<Value>> {
    match document {
        // Only a list under `models` counts; other keys are ignored
        Value::Object(mut map) => match map.remove("models") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(RegistryError::not_an_array()),
        },
        // Scalars and null (an empty YAML document) are not a registry
        _ => Err(RegistryError::not_an_array()),
    }
}

// Decodes every element on its own so the error can name the bad one
fn decode_records(items: Vec<Value>) -> Result<Vec<ModelRecord>> {
    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<ModelRecord>(item).map_err(|e| {
                RegistryError::InvalidFormat(format!("invalid model at index {}: {}", i, e))
            })
        })
        // collect() into Result stops at the first Err
        .collect::<Result<Vec<_>>>()?;

    Ok(normalize_models(records))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why decode into a Value first instead of straight into Vec<ModelRecord>?
//    - The top level can be a list or a {"models": [...]} object
//    - Decoding each element separately lets the error name its index
//
// 2. Why two Value types for YAML?
//    - serde_yaml::Value knows about merge keys (`<<: *base`)
//    - serde_json::Value is what the rest of the parser works with
//
// 3. What does `Value::Array(items) if !items.is_empty()` mean?
//    - A match arm with a guard: an empty list falls through to the next arm
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelStatus;

    fn parse_json(content: &str) -> Result<Vec<ModelRecord>> {
        parse_models(content.as_bytes(), "models.json")
    }

    fn parse_yaml(content: &str) -> Result<Vec<ModelRecord>> {
        parse_models(content.as_bytes(), "models.yaml")
    }

    #[test]
    fn test_parse_json_array() {
        let models = parse_json(
            r#"[
                {"id": "m1", "name": "Model One", "version": "1.0", "status": "production"},
                {"id": "m2", "name": "Model Two", "version": "2.0", "status": "staging"}
            ]"#,
        )
        .unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "m1");
        assert_eq!(models[0].status, ModelStatus::Production);
        assert_eq!(models[1].name, "Model Two");
        assert_eq!(models[1].status, ModelStatus::Staging);
    }

    #[test]
    fn test_parse_json_preserves_order() {
        let items: Vec<String> = (0..50)
            .map(|i| format!(r#"{{"id": "m{}", "name": "Model {}"}}"#, i, i))
            .collect();
        let content = format!("[{}]", items.join(","));

        let models = parse_json(&content).unwrap();
        assert_eq!(models.len(), 50);
        for (i, model) in models.iter().enumerate() {
            assert_eq!(model.id, format!("m{}", i));
        }
    }

    #[test]
    fn test_parse_json_wrapped_in_models_key() {
        // {"models": [{"id":"m1"}]} -> one record, everything else defaulted
        let models = parse_models(br#"{"models": [{"id": "m1"}]}"#, "config.json").unwrap();

        assert_eq!(models.len(), 1);
        let m = &models[0];
        assert_eq!(m.id, "m1");
        assert_eq!(m.name, "Unnamed Model");
        assert_eq!(m.version, "Unknown");
        assert_eq!(m.framework, "Unknown");
        assert_eq!(m.status, ModelStatus::Development);
        assert_eq!(m.owner, "Unknown");
        assert_eq!(m.created_at, "Unknown");
        assert_eq!(m.updated_at, "Unknown");
        assert!(m.description.is_none());
        assert!(m.metrics.is_none());
        assert!(m.files.is_none());
        assert!(m.versions.is_none());
    }

    #[test]
    fn test_parse_bogus_status_becomes_development() {
        let models = parse_json(r#"[{"id":"x","status":"bogus"}]"#).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].status, ModelStatus::Development);
    }

    #[test]
    fn test_any_unknown_status_becomes_development() {
        for status in ["", "PRODUCTION", "live", "deprecated", "Staging "] {
            let content = format!(r#"[{{"status": "{}"}}]"#, status);
            let models = parse_json(&content).unwrap();
            assert_eq!(models[0].status, ModelStatus::Development, "status {:?}", status);
        }
    }

    #[test]
    fn test_parse_minimal_fields() {
        let models = parse_json(r#"[{"name": "Minimal"}, {}]"#).unwrap();

        assert_eq!(models[0].id, "model-0");
        assert_eq!(models[0].name, "Minimal");
        assert_eq!(models[1].id, "model-1");
        assert_eq!(models[1].name, "Unnamed Model");
    }

    // Quirk: the JSON decoder accepts an empty top-level list...
    #[test]
    fn test_empty_json_array_is_empty_registry() {
        let models = parse_json("[]").unwrap();
        assert!(models.is_empty());
    }

    // ...while the YAML decoder rejects it
    #[test]
    fn test_empty_yaml_array_is_invalid_format() {
        let err = parse_yaml("[]").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat(_)));
        assert_eq!(err.to_string(), "config file must contain an array of models");
    }

    #[test]
    fn test_empty_models_key_is_accepted_in_both_formats() {
        assert!(parse_json(r#"{"models": []}"#).unwrap().is_empty());
        assert!(parse_yaml("models: []\n").unwrap().is_empty());
    }

    #[test]
    fn test_empty_content_regardless_of_extension() {
        for path in ["models.json", "models.yaml", "models.yml", "models"] {
            let err = parse_models(b"", path).unwrap_err();
            assert!(matches!(err, RegistryError::EmptyConfig), "path {}", path);
        }
    }

    #[test]
    fn test_parse_yaml_list() {
        let models = parse_yaml(
            r#"
- id: m1
  name: YAML Model
  version: "1.0"
  status: production
"#,
        )
        .unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "YAML Model");
        assert_eq!(models[0].version, "1.0");
        assert_eq!(models[0].status, ModelStatus::Production);
    }

    #[test]
    fn test_parse_yaml_wrapped_with_yml_extension() {
        let content = "models:\n  - id: m1\n    name: Wrapped\n";
        let models = parse_models(content.as_bytes(), "config/Models.YML").unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "Wrapped");
    }

    #[test]
    fn test_yaml_scalars_coerced_to_strings() {
        let models = parse_yaml(
            r#"
- id: 42
  name: Churn
  version: 1.0
  owner: true
  createdAt: 2024-01-15
  updatedAt: 2024-02-01T10:30:00Z
  description: null
"#,
        )
        .unwrap();

        let m = &models[0];
        assert_eq!(m.id, "42");
        assert_eq!(m.version, "1.0");
        assert_eq!(m.owner, "true");
        assert_eq!(m.created_at, "2024-01-15");
        assert_eq!(m.updated_at, "2024-02-01T10:30:00Z");
        assert!(m.description.is_none());
    }

    #[test]
    fn test_null_required_field_is_defaulted() {
        let models = parse_json(r#"[{"id": null, "name": null, "version": 3}]"#).unwrap();
        assert_eq!(models[0].id, "model-0");
        assert_eq!(models[0].name, "Unnamed Model");
        assert_eq!(models[0].version, "3");
    }

    #[test]
    fn test_empty_description_is_kept_distinct_from_missing() {
        let models = parse_json(r#"[{"id": "a", "description": ""}, {"id": "b"}]"#).unwrap();
        assert_eq!(models[0].description.as_deref(), Some(""));
        assert!(models[1].description.is_none());
    }

    #[test]
    fn test_parse_all_fields_round_trip() {
        let content = r#"[{
            "id": "fraud-detector",
            "name": "Fraud Detector",
            "version": "2.1.0",
            "description": "Flags suspicious transactions",
            "framework": "xgboost",
            "status": "production",
            "owner": "risk-team",
            "createdAt": "2024-01-01",
            "updatedAt": "2024-03-01",
            "metrics": {"accuracy": 0.97, "latency": 12},
            "files": {
                "modelCard": "docs/card.md",
                "trainingScript": "train.py",
                "featureScript": "features.py",
                "inferenceScript": "serve.py",
                "modelFile": "model.bin"
            },
            "versions": [{
                "version": "2.1.0",
                "createdAt": "2024-03-01",
                "notes": "retrained",
                "datasets": [{
                    "id": "tx",
                    "name": "Transactions",
                    "filePath": "data/tx.csv",
                    "addedAt": "2024-02-28",
                    "description": "Q1 transactions",
                    "rowCount": 120000,
                    "columns": ["amount", "merchant"]
                }]
            }],
            "unknownField": {"ignored": true}
        }]"#;

        let models = parse_json(content).unwrap();
        let m = &models[0];

        assert_eq!(m.id, "fraud-detector");
        assert_eq!(m.description.as_deref(), Some("Flags suspicious transactions"));
        assert_eq!(m.status, ModelStatus::Production);

        let metrics = m.metrics.as_ref().unwrap();
        assert_eq!(metrics.accuracy, Some(0.97));
        assert_eq!(metrics.latency, Some(12.0));

        let files = m.files.as_ref().unwrap();
        assert_eq!(files.training_script.as_deref(), Some("train.py"));
        assert_eq!(files.model_file.as_deref(), Some("model.bin"));

        let versions = m.versions.as_ref().unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].notes.as_deref(), Some("retrained"));
        let dataset = &versions[0].datasets[0];
        assert_eq!(dataset.file_path, "data/tx.csv");
        assert_eq!(dataset.row_count, Some(120000));
        assert_eq!(dataset.columns.as_ref().unwrap().len(), 2);

        // A fully populated record comes back out unchanged
        let reencoded = serde_json::to_vec(&models).unwrap();
        assert_eq!(parse_json(std::str::from_utf8(&reencoded).unwrap()).unwrap(), models);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let models = parse_json(
            r#"[{}, {"id": "keep", "status": "archived"}, {"name": "x", "status": "nope"}]"#,
        )
        .unwrap();

        let again = normalize_models(models.clone());
        assert_eq!(again, models);
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_json("{not json").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat(_)));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse_yaml("- id: [unclosed").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat(_)));
    }

    #[test]
    fn test_not_an_array() {
        for content in [r#"{"name": "solo"}"#, r#""text""#, "42", r#"{"models": {"id": "x"}}"#] {
            let err = parse_json(content).unwrap_err();
            assert_eq!(err.to_string(), "config file must contain an array of models");
        }
        assert!(parse_yaml("name: solo\n").is_err());
        assert!(parse_yaml("# only a comment\n").is_err());
    }

    #[test]
    fn test_yaml_extension_selects_decoder() {
        // Valid YAML, invalid JSON: only parses when the path says YAML
        let content = "- id: m1\n";
        assert!(parse_models(content.as_bytes(), "models.yml").is_ok());
        assert!(parse_models(content.as_bytes(), "models.json").is_err());
        assert!(parse_models(content.as_bytes(), "models.txt").is_err());
    }

    #[test]
    fn test_bad_element_reports_index() {
        let err = parse_json(r#"[{"id": "ok"}, "just a string"]"#).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat(_)));
        assert!(err.to_string().contains("index 1"));

        let err = parse_json(r#"[{"name": ["not", "a", "string"]}]"#).unwrap_err();
        assert!(err.to_string().contains("index 0"));
    }

    #[test]
    fn test_yaml_merge_keys_are_applied() {
        let models = parse_yaml(
            r#"
- &base
  id: m1
  framework: pytorch
  owner: ml-team
- <<: *base
  id: m2
"#,
        )
        .unwrap();

        assert_eq!(models.len(), 2);
        // Keys set next to the merge win over the merged ones
        assert_eq!(models[1].id, "m2");
        assert_eq!(models[1].framework, "pytorch");
        assert_eq!(models[1].owner, "ml-team");
    }

    #[test]
    fn test_yaml_merge_inside_nested_fields() {
        let models = parse_yaml(
            r#"
models:
  - id: m1
    files: &files
      modelCard: docs/card.md
      modelFile: model.bin
  - id: m2
    files:
      <<: *files
      modelFile: model-v2.bin
"#,
        )
        .unwrap();

        let files = models[1].files.as_ref().unwrap();
        assert_eq!(files.model_card.as_deref(), Some("docs/card.md"));
        assert_eq!(files.model_file.as_deref(), Some("model-v2.bin"));
    }

    #[test]
    fn test_yaml_merge_of_a_scalar_is_rejected() {
        let err = parse_yaml("- id: m1\n  <<: just-a-string\n").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat(_)));
    }

    #[test]
    fn test_huge_integer_falls_back_to_float_text() {
        // Integers past u64 lose their exact digits
        let models = parse_json(r#"[{"id": 123456789012345678901234}]"#).unwrap();
        let id: f64 = models[0].id.parse().unwrap();
        assert!((id - 1.2345678901234568e23).abs() < 1e9);
        assert_ne!(models[0].id, "123456789012345678901234");
    }

    #[test]
    fn test_yaml_nan_metric_reads_as_absent() {
        let models = parse_yaml("- id: m1\n  metrics:\n    accuracy: .nan\n    latency: 12\n").unwrap();
        let metrics = models[0].metrics.as_ref().unwrap();
        assert_eq!(metrics.accuracy, None);
        assert_eq!(metrics.latency, Some(12.0));
    }

    #[test]
    fn test_is_yaml_path() {
        assert!(is_yaml_path("models.yaml"));
        assert!(is_yaml_path("models.yml"));
        assert!(is_yaml_path("CONFIG/MODELS.YAML"));
        assert!(!is_yaml_path("models.json"));
        assert!(!is_yaml_path("yaml"));
        assert!(!is_yaml_path("models.yaml.bak"));
    }
}
