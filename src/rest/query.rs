//! Filter parameters for list requests.
//!
//! Filters are passed through to the server verbatim. A list value becomes a
//! repeated key (`?site=ams1&site=fra1`), which NetBox reads as "any of".

use serde::Serialize;
use serde_json::Value;

use crate::rest::ResourceError;

/// Query parameters for `all`, `filter`, `get_by` and `count`.
///
/// # Example
///
/// ```rust
/// use netbox_api::rest::Query;
/// use serde_json::json;
///
/// let query = Query::new()
///     .param("site", json!(["ams1", "fra1"]))
///     .param("status", "active")
///     .param("has_primary_ip", true)
///     .limit(100);
///
/// assert_eq!(
///     query.pairs(),
///     &[
///         ("site".to_string(), "ams1".to_string()),
///         ("site".to_string(), "fra1".to_string()),
///         ("status".to_string(), "active".to_string()),
///         ("has_primary_ip".to_string(), "true".to_string()),
///         ("limit".to_string(), "100".to_string()),
///     ]
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a query from any serializable struct or map.
    ///
    /// `None` fields are skipped and list fields repeat their key.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidQuery`] if `params` does not serialize
    /// to a JSON object.
    pub fn from_serialize<T: Serialize>(params: &T) -> Result<Self, ResourceError> {
        let value = serde_json::to_value(params).map_err(|e| ResourceError::InvalidQuery {
            message: format!("Failed to serialize params: {e}"),
        })?;

        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .fold(Self::new(), |query, (key, val)| query.param(key, val))),
            other => Err(ResourceError::InvalidQuery {
                message: format!("expected an object of filters, got {other}"),
            }),
        }
    }

    /// Adds a filter. Lists repeat the key; `null` is skipped.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        match value.into() {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(&item) {
                        self.pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(&other) {
                    self.pairs.push((key, text));
                }
            }
        }
        self
    }

    /// Adds a free-text search (`q`).
    #[must_use]
    pub fn search(self, text: impl Into<String>) -> Self {
        self.param("q", text.into())
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit)
    }

    /// Requests a single page starting at `offset`.
    #[must_use]
    pub fn offset(self, offset: u64) -> Self {
        self.param("offset", offset)
    }

    /// Returns `true` if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the parameters in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Consumes the query and returns its parameters.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |query, (key, value)| query.param(key, value))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // Nested structures are sent as JSON text.
        other => Some(other.to_string()),
    }
}
