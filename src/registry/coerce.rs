// src/registry/coerce.rs
// =============================================================================
// Permissive field decoders used by the model schema.
//
// Config files are hand-written, so a string field may arrive as a number
// (`version: 2`), a boolean, or null. Before a string field is type-checked
// we turn any scalar into its textual form; null becomes "" for required
// fields and None for optional ones. Sequences and mappings are still errors.
//
// YAML dates like `createdAt: 2024-01-15` never reach this code as dates:
// serde_yaml hands them over as the plain string "2024-01-15".
// =============================================================================

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// Required string field: scalar -> text, null -> ""
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    // Accept whatever the document holds, then decide
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).map_err(D::Error::custom)
}

// Optional string field: null -> None, scalar -> Some(text)
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        other => scalar_to_string(other).map(Some).map_err(D::Error::custom),
    }
}

// Optional list of strings, each element coerced like `string`
pub fn opt_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    // null -> None; a list of anything -> check each element below
    let items: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    items
        .map(|items| {
            items
                .into_iter()
                .map(scalar_to_string)
                .collect::<Result<Vec<String>, String>>()
        })
        .transpose()
        .map_err(D::Error::custom)
}

// Treats an explicit null the same as a missing field
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Textual form of a scalar
//
// Numbers use serde_json's formatting: 2 -> "2", 1.0 -> "1.0", 1.10 -> "1.1".
// Integers too large for 64 bits arrive as floats and keep only ~17 digits.
fn scalar_to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) => Err("expected a string, found a sequence".to_string()),
        Value::Object(_) => Err("expected a string, found a mapping".to_string()),
    }
}
