//! Field values and the rules that build them from raw JSON.
//!
//! Every attribute of a [`Record`] is a [`FieldValue`]: a plain JSON value,
//! a nested record, or a list mixing both. Incoming JSON is coerced field by
//! field, in this order:
//!
//! 1. Pass-through JSON fields (`custom_fields`, `local_context_data`,
//!    `config_context`, plus any field a model declares as
//!    [`FieldKind::Json`]) are stored untouched.
//! 2. Mappings become nested records, typed by the parent model's declared
//!    [`FieldKind::Nested`] model when there is one.
//! 3. Lists are coerced element by element with the same rule, keeping order.
//! 4. Scalars are stored as they are.
//!
//! Coercion never fails: unknown shapes degrade to generic records.
//!
//! Values assigned by the caller through [`Record::set`] are not coerced;
//! `record.set("tags", json!([11]))` stores the raw list.

use serde_json::Value;

use crate::rest::endpoint::EndpointHandle;
use crate::rest::models::{FieldKind, RecordModel};
use crate::rest::record::Record;

/// The value of one record attribute.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// A scalar, an opaque JSON blob, or a raw value assigned by the caller.
    Value(Value),
    /// A nested record.
    Record(Box<Record>),
    /// A list built from JSON, possibly holding nested records.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns the string value, if this is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(v) => v.as_str(),
            _ => None,
        }
    }

    /// Returns the integer value, if this is a JSON integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Value(v) => v.as_i64(),
            _ => None,
        }
    }

    /// Returns the unsigned integer value, if this is a non-negative JSON integer.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Value(v) => v.as_u64(),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a JSON boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Value(v) => v.as_bool(),
            _ => None,
        }
    }

    /// Returns the nested record, if this is one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the nested record mutably, if this is one.
    #[must_use]
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the list elements, if this is a coerced list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the raw JSON value, if this is one.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` for JSON `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Returns non-empty display text for strings, numbers and records.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Self::Value(Value::String(s)) => s.clone(),
            Self::Value(Value::Number(n)) => n.to_string(),
            Self::Record(record) => record.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Expands the value into JSON, nested records included in full.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Record(record) => record.to_json(),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        Self::Record(Box::new(record))
    }
}

impl From<Vec<Record>> for FieldValue {
    fn from(records: Vec<Record>) -> Self {
        Self::List(records.into_iter().map(Self::from).collect())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Value(Value::Null), Into::into)
    }
}

/// Coerces the JSON value of `field` for a record of `model`.
///
/// Nested records inherit `parent`, unless their own `url` maps to a
/// different endpoint.
pub(crate) fn coerce(
    field: &str,
    value: Value,
    model: &'static RecordModel,
    parent: Option<&EndpointHandle>,
) -> FieldValue {
    if model.is_json_field(field) {
        return FieldValue::Value(value);
    }

    let declared = match model.field_kind(field) {
        Some(FieldKind::Nested(nested)) => Some(nested),
        _ => None,
    };

    coerce_value(value, declared, parent)
}

fn coerce_value(
    value: Value,
    declared: Option<&'static RecordModel>,
    parent: Option<&EndpointHandle>,
) -> FieldValue {
    match value {
        Value::Object(_) => FieldValue::Record(Box::new(Record::nested(value, declared, parent))),
        Value::Array(items) => FieldValue::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(_) => {
                        FieldValue::Record(Box::new(Record::nested(item, declared, parent)))
                    }
                    scalar => FieldValue::Value(scalar),
                })
                .collect(),
        ),
        scalar => FieldValue::Value(scalar),
    }
}
