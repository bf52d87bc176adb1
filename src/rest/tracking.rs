//! Change tracking for minimal partial updates.
//!
//! A [`Record`](crate::rest::Record) keeps two attribute trees: the live one
//! the caller mutates and a snapshot taken when the record was built or last
//! saved. This module turns either tree into the flat JSON body the API
//! accepts and compares the two field by field.
//!
//! # Serialization
//!
//! - Nested records collapse to a reference: their `id`, else their `value`
//!   (choice fields), else the model's nested return, else their text.
//! - Lists of records collapse to lists of references.
//! - Set-like lists (`tags`, `tagged_vlans`) are de-duplicated, keeping first
//!   occurrences, when every element is a string or every element is an
//!   integer. Mixed lists are left alone.
//! - Pass-through JSON fields flatten `{"value": X}` entries to `X`.
//!
//! # Equality
//!
//! Ordinary lists compare by content and order. Set-like lists compare by
//! content only. Mappings compare as unordered key/value sets.
//!
//! # Example
//!
//! ```rust
//! use netbox_api::rest::Record;
//! use serde_json::json;
//!
//! let mut record = Record::new(json!({
//!     "id": 1,
//!     "name": "edge-1",
//!     "tags": [{"id": 1, "name": "core"}],
//! }), None);
//!
//! // Nothing changed yet
//! assert!(record.diff().is_empty());
//!
//! record.set("tags", json!([1, 1]));
//! // Same set of tag ids once de-duplicated
//! assert!(record.diff().is_empty());
//!
//! record.set("name", "edge-2");
//! assert_eq!(record.updates(), json!({"name": "edge-2"}).as_object().cloned().unwrap());
//! ```

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::rest::coercion::FieldValue;
use crate::rest::models::{is_list_as_set, RecordModel};
use crate::rest::record::Record;

/// Serializes an attribute tree into the JSON body sent to the API.
pub(crate) fn serialize_fields(
    fields: &IndexMap<String, FieldValue>,
    model: &RecordModel,
) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), serialize_field(name, value, model)))
        .collect()
}

fn serialize_field(name: &str, value: &FieldValue, model: &RecordModel) -> Value {
    if model.is_json_field(name) {
        return match value {
            FieldValue::Value(Value::Object(map)) => flatten_choices(map),
            other => serialize_value(other),
        };
    }

    let serialized = serialize_value(value);
    match serialized {
        Value::Array(items) if is_list_as_set(name) => Value::Array(dedup_if_homogeneous(items)),
        other => other,
    }
}

fn serialize_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Value(v) => v.clone(),
        FieldValue::Record(record) => nested_reference(record),
        FieldValue::List(items) => Value::Array(items.iter().map(serialize_value).collect()),
    }
}

/// Returns the value a nested record is replaced by when serialized.
pub(crate) fn nested_reference(record: &Record) -> Value {
    for field in ["id", "value"] {
        if let Some(FieldValue::Value(v)) = record.get(field) {
            if !v.is_null() {
                return v.clone();
            }
        }
    }

    record
        .model()
        .nested_return
        .and_then(|nested_return| nested_return(record))
        .unwrap_or_else(|| Value::String(record.to_string()))
}

/// Flattens `{"field": {"value": X, ...}}` entries to `{"field": X}`.
fn flatten_choices(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| {
                let flat = match value {
                    Value::Object(inner) if inner.contains_key("value") => inner["value"].clone(),
                    other => other.clone(),
                };
                (key.clone(), flat)
            })
            .collect(),
    )
}

fn dedup_if_homogeneous(items: Vec<Value>) -> Vec<Value> {
    let all_strings = items.iter().all(Value::is_string);
    let all_integers = items.iter().all(|v| v.is_i64() || v.is_u64());
    if !(all_strings || all_integers) {
        return items;
    }

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_string()))
        .collect()
}

/// Returns the names of fields whose serialized values differ.
///
/// Fields present on only one side count as changed.
pub(crate) fn diff_serialized(
    current: &Map<String, Value>,
    origin: &Map<String, Value>,
) -> BTreeSet<String> {
    let keys: BTreeSet<&String> = current.keys().chain(origin.keys()).collect();

    keys.into_iter()
        .filter(|key| match (current.get(*key), origin.get(*key)) {
            (Some(a), Some(b)) => !values_equal(key, a, b),
            _ => true,
        })
        .cloned()
        .collect()
}

fn values_equal(field: &str, a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) if is_list_as_set(field) => as_set(x) == as_set(y),
        _ => a == b,
    }
}

fn as_set(items: &[Value]) -> BTreeSet<String> {
    items.iter().map(Value::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::models::GENERIC;
    use serde_json::json;

    fn fields(value: Value) -> IndexMap<String, FieldValue> {
        let record = Record::new(value, None);
        record
            .fields()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_nested_record_serializes_to_id() {
        let serialized = serialize_fields(
            &fields(json!({"site": {"id": 3, "name": "ams1"}})),
            &GENERIC,
        );
        assert_eq!(serialized["site"], json!(3));
    }

    #[test]
    fn test_choice_record_serializes_to_value() {
        let serialized = serialize_fields(
            &fields(json!({"status": {"value": "active", "label": "Active"}})),
            &GENERIC,
        );
        assert_eq!(serialized["status"], json!("active"));
    }

    #[test]
    fn test_record_without_reference_serializes_to_text() {
        let serialized = serialize_fields(&fields(json!({"parent": {"name": "rack-1"}})), &GENERIC);
        assert_eq!(serialized["parent"], json!("rack-1"));
    }

    #[test]
    fn test_list_of_records_serializes_to_ids() {
        let serialized = serialize_fields(
            &fields(json!({"vlans": [{"id": 10, "vid": 10}, {"id": 20, "vid": 20}]})),
            &GENERIC,
        );
        assert_eq!(serialized["vlans"], json!([10, 20]));
    }

    #[test]
    fn test_set_like_list_is_deduplicated() {
        let serialized = serialize_fields(&fields(json!({"tags": ["foo", "bar", "foo"]})), &GENERIC);
        assert_eq!(serialized["tags"], json!(["foo", "bar"]));
    }

    #[test]
    fn test_ordinary_list_keeps_duplicates() {
        let serialized = serialize_fields(&fields(json!({"vlans": [1, 1, 2]})), &GENERIC);
        assert_eq!(serialized["vlans"], json!([1, 1, 2]));
    }

    #[test]
    fn test_mixed_set_like_list_is_left_alone() {
        let items = vec![json!(1), json!("1"), json!(1)];
        assert_eq!(dedup_if_homogeneous(items.clone()), items);
    }

    #[test]
    fn test_custom_fields_choices_are_flattened() {
        let serialized = serialize_fields(
            &fields(json!({"custom_fields": {
                "tier": {"value": "gold", "label": "Gold"},
                "owner": "ops",
                "asset": null
            }})),
            &GENERIC,
        );
        assert_eq!(
            serialized["custom_fields"],
            json!({"tier": "gold", "owner": "ops", "asset": null})
        );
    }

    #[test]
    fn test_diff_treats_set_like_lists_as_sets() {
        let a = json!({"tags": [1, 2]}).as_object().cloned().unwrap();
        let b = json!({"tags": [2, 1]}).as_object().cloned().unwrap();
        assert!(diff_serialized(&a, &b).is_empty());
    }

    #[test]
    fn test_diff_treats_ordinary_lists_as_ordered() {
        let a = json!({"vlans": [1, 2]}).as_object().cloned().unwrap();
        let b = json!({"vlans": [2, 1]}).as_object().cloned().unwrap();
        assert_eq!(
            diff_serialized(&a, &b).into_iter().collect::<Vec<_>>(),
            vec!["vlans".to_string()]
        );
    }

    #[test]
    fn test_diff_ignores_mapping_key_order() {
        let a: Map<String, Value> =
            serde_json::from_str(r#"{"custom_fields": {"a": 1, "b": 2}}"#).unwrap();
        let b: Map<String, Value> =
            serde_json::from_str(r#"{"custom_fields": {"b": 2, "a": 1}}"#).unwrap();
        assert!(diff_serialized(&a, &b).is_empty());
    }

    #[test]
    fn test_diff_reports_one_sided_fields() {
        let a = json!({"name": "x", "serial": "1"}).as_object().cloned().unwrap();
        let b = json!({"name": "x"}).as_object().cloned().unwrap();
        assert_eq!(
            diff_serialized(&a, &b).into_iter().collect::<Vec<_>>(),
            vec!["serial".to_string()]
        );
    }
}
