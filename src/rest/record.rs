//! Change-tracked records.
//!
//! A [`Record`] is the in-memory form of one remote resource. It holds the
//! attributes the caller reads and mutates, a snapshot of the attributes as
//! they were when the record was built or last saved, and a weak handle to
//! the endpoint it belongs to.
//!
//! # Partial and full records
//!
//! Records built from list responses may lack fields that only the detail
//! view carries. [`Record::attr`] fetches the detail view the first time a
//! missing field is requested, merges it in, and never fetches again.
//! [`Record::get`] never fetches.
//!
//! # Saving
//!
//! [`Record::save`] sends only the fields whose serialized value differs
//! from the snapshot, and returns `Ok(false)` without any request when
//! nothing changed.
//!
//! # Example
//!
//! ```rust,ignore
//! use netbox_api::{Api, BaseUrl, NetboxConfig};
//!
//! let api = Api::new(config)?;
//! let devices = api.dcim().endpoint("devices");
//!
//! let mut device = devices.get(1).await?.expect("device exists");
//! device.set("serial", "FDO1234X0AB");
//!
//! assert!(device.save().await?);   // PATCH {"serial": "FDO1234X0AB"}
//! assert!(!device.save().await?);  // nothing left to send
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::rest::coercion::{coerce, FieldValue};
use crate::rest::endpoint::{DetailEndpoint, Endpoint, EndpointHandle};
use crate::rest::models::{default_display, detail_model, RecordModel, GENERIC};
use crate::rest::trace::CableSegment;
use crate::rest::tracking::{diff_serialized, serialize_fields};
use crate::rest::ResourceError;

/// One remote resource with change tracking.
///
/// Records compare equal, and hash the same, when they belong to the same
/// endpoint and carry the same id.
#[derive(Clone, Debug)]
pub struct Record {
    attributes: IndexMap<String, FieldValue>,
    origin: IndexMap<String, FieldValue>,
    has_details: bool,
    model: &'static RecordModel,
    endpoint: Option<EndpointHandle>,
}

// Verify Record is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Record>();
};

impl Record {
    /// Builds a generic record from JSON.
    ///
    /// When the JSON carries a `url` that maps to an endpoint of the same
    /// client, that endpoint is used instead of `endpoint`. Non-object values
    /// yield a record with no attributes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use netbox_api::rest::Record;
    /// use serde_json::json;
    ///
    /// let record = Record::new(json!({"id": 1, "name": "ams1"}), None);
    /// assert_eq!(record.id(), Some(1));
    /// assert_eq!(record.to_string(), "ams1");
    /// assert!(!record.has_details());
    /// ```
    #[must_use]
    pub fn new(values: Value, endpoint: Option<EndpointHandle>) -> Self {
        Self::with_model(values, &GENERIC, endpoint)
    }

    /// Builds a record of a specific model from JSON.
    #[must_use]
    pub fn with_model(
        values: Value,
        model: &'static RecordModel,
        endpoint: Option<EndpointHandle>,
    ) -> Self {
        let own = own_handle(&values, endpoint.as_ref()).or(endpoint);
        let context = own.clone();
        Self::build(values, model, own, context.as_ref())
    }

    /// Builds a nested record during coercion.
    pub(crate) fn nested(
        values: Value,
        declared: Option<&'static RecordModel>,
        parent: Option<&EndpointHandle>,
    ) -> Self {
        let own = own_handle(&values, parent);
        let model = declared
            .or_else(|| own.as_ref().and_then(EndpointHandle::registered_model))
            .unwrap_or(&GENERIC);
        // A url that does not map leaves the record unaddressable
        let endpoint = if values.get("url").is_some_and(Value::is_string) {
            own
        } else {
            parent.cloned()
        };
        Self::build(values, model, endpoint, parent)
    }

    fn build(
        values: Value,
        model: &'static RecordModel,
        endpoint: Option<EndpointHandle>,
        context: Option<&EndpointHandle>,
    ) -> Self {
        let mut record = Self {
            attributes: IndexMap::new(),
            origin: IndexMap::new(),
            has_details: false,
            model,
            endpoint,
        };
        record.attributes = record.parse_values(values, context);
        record.origin = record.attributes.clone();
        record
    }

    /// Coerces every field, resolving nested records through `context`.
    fn parse_values(
        &self,
        values: Value,
        context: Option<&EndpointHandle>,
    ) -> IndexMap<String, FieldValue> {
        let Value::Object(map) = values else {
            return IndexMap::new();
        };
        map.into_iter()
            .map(|(field, value)| {
                let coerced = coerce(&field, value, self.model, context);
                (field, coerced)
            })
            .collect()
    }

    /// Returns the value of `field` without fetching anything.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.attributes.get(field)
    }

    /// Returns the value of `field` mutably without fetching anything.
    #[must_use]
    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.attributes.get_mut(field)
    }

    /// Returns the value of `field`, fetching the full record first if the
    /// field is missing from a partial record.
    ///
    /// The detail view is fetched at most once per record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::AttributeNotFound`] if the field is still
    /// missing, or the fetch error if the detail request fails.
    pub async fn attr(&mut self, field: &str) -> Result<&FieldValue, ResourceError> {
        if !self.resolve_if_partial(field).await? {
            return Err(self.attribute_not_found(field));
        }
        self.attributes
            .get(field)
            .ok_or_else(|| self.attribute_not_found(field))
    }

    /// Makes sure `field` is loaded if it can be, and reports whether it is.
    ///
    /// Fetches only when the field is missing, the record is partial, it
    /// has a `url`, an id and a live endpoint.
    async fn resolve_if_partial(&mut self, field: &str) -> Result<bool, ResourceError> {
        if self.attributes.contains_key(field) {
            return Ok(true);
        }
        if self.has_details || self.url().is_none() || self.identity().is_none() {
            return Ok(false);
        }
        if self.live_endpoint("fetch").is_err() {
            return Ok(false);
        }

        self.full_details().await?;
        Ok(self.attributes.contains_key(field))
    }

    /// Fetches the detail view and merges it into this record.
    ///
    /// Fetched fields overwrite current values and the snapshot alike.
    /// Returns `Ok(false)` if the record was already full.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentity`] or
    /// [`ResourceError::EndpointUnavailable`] if the record cannot be
    /// addressed, or the error of the detail request.
    pub async fn full_details(&mut self) -> Result<bool, ResourceError> {
        if self.has_details {
            return Ok(false);
        }
        let id = self.identity_key().ok_or(ResourceError::MissingIdentity {
            operation: "fetch details of",
        })?;
        let endpoint = self.live_endpoint("fetch")?;

        tracing::debug!(endpoint = %endpoint.name(), id = %id, "Fetching full record details");
        let values = endpoint.get_one(&id).await?;

        let context = endpoint.handle();
        for (field, value) in self.parse_values(values, Some(&context)) {
            self.origin.insert(field.clone(), value.clone());
            self.attributes.insert(field, value);
        }
        self.has_details = true;
        Ok(true)
    }

    /// Returns the record id, if it is a non-negative integer.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.identity().and_then(Value::as_u64)
    }

    /// Returns the raw record identity, if it is set and not null.
    #[must_use]
    pub fn identity(&self) -> Option<&Value> {
        match self.attributes.get("id") {
            Some(FieldValue::Value(v)) if !v.is_null() => Some(v),
            _ => None,
        }
    }

    fn identity_key(&self) -> Option<String> {
        self.identity().map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Returns the record's `url` field.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.get("url").and_then(FieldValue::as_str)
    }

    /// Returns `true` once the detail view has been loaded.
    #[must_use]
    pub const fn has_details(&self) -> bool {
        self.has_details
    }

    pub(crate) fn mark_full(&mut self) {
        self.has_details = true;
    }

    /// Returns the record model.
    #[must_use]
    pub const fn model(&self) -> &'static RecordModel {
        self.model
    }

    /// Returns the handle of the endpoint this record belongs to.
    #[must_use]
    pub const fn endpoint(&self) -> Option<&EndpointHandle> {
        self.endpoint.as_ref()
    }

    /// Iterates over fields in the order the server sent them.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the `created` timestamp, if present and well-formed.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.timestamp("created")
    }

    /// Returns the `last_updated` timestamp, if present and well-formed.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.timestamp("last_updated")
    }

    fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        let text = self.get(field)?.as_str()?;
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Assigns a field. The snapshot is left untouched.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.attributes.insert(field.into(), value.into());
    }

    /// Serializes the current attributes into an API request body.
    #[must_use]
    pub fn serialize(&self) -> Map<String, Value> {
        serialize_fields(&self.attributes, self.model)
    }

    /// Serializes the snapshot the same way as [`serialize`](Self::serialize).
    #[must_use]
    pub fn serialize_origin(&self) -> Map<String, Value> {
        serialize_fields(&self.origin, self.model)
    }

    /// Returns the names of fields changed since the snapshot.
    #[must_use]
    pub fn diff(&self) -> BTreeSet<String> {
        diff_serialized(&self.serialize(), &self.serialize_origin())
    }

    /// Returns the request body for a partial update.
    ///
    /// Empty when nothing changed or when the record has no id.
    #[must_use]
    pub fn updates(&self) -> Map<String, Value> {
        if self.identity().is_none() {
            return Map::new();
        }
        let diff = self.diff();
        self.serialize()
            .into_iter()
            .filter(|(field, _)| diff.contains(field))
            .collect()
    }

    pub(crate) fn mark_clean(&mut self) {
        self.origin = self.attributes.clone();
    }

    /// Sends changed fields to the server.
    ///
    /// Returns `Ok(true)` if an update was sent, `Ok(false)` if there was
    /// nothing to send. After a successful save the snapshot equals the
    /// current attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentity`] for changed records without
    /// an id, [`ResourceError::EndpointUnavailable`] if the endpoint is gone,
    /// or the error of the PATCH request.
    pub async fn save(&mut self) -> Result<bool, ResourceError> {
        if self.diff().is_empty() {
            tracing::debug!(record = %self.describe(), "No changes to save");
            return Ok(false);
        }
        let id = self
            .identity_key()
            .ok_or(ResourceError::MissingIdentity { operation: "save" })?;
        let updates = self.updates();
        if updates.is_empty() {
            return Ok(false);
        }

        let endpoint = self.live_endpoint("save")?;
        endpoint.patch(&id, updates).await?;
        self.mark_clean();
        Ok(true)
    }

    /// Assigns every given field, then [`save`](Self::save)s.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub async fn update<I, K, V>(&mut self, values: I) -> Result<bool, ResourceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        for (field, value) in values {
            self.set(field, value);
        }
        self.save().await
    }

    /// Deletes the record on the server.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentity`] for records without an id,
    /// [`ResourceError::EndpointUnavailable`] if the endpoint is gone, or the
    /// error of the DELETE request.
    pub async fn delete(&self) -> Result<bool, ResourceError> {
        let id = self
            .identity_key()
            .ok_or(ResourceError::MissingIdentity { operation: "delete" })?;
        let endpoint = self.live_endpoint("delete")?;
        endpoint.delete_one(&id).await
    }

    /// Returns a detail endpoint under this record (e.g. `available-ips`).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentity`] or
    /// [`ResourceError::EndpointUnavailable`] if the record cannot be
    /// addressed.
    pub fn detail_endpoint(&self, name: &str) -> Result<DetailEndpoint, ResourceError> {
        let id = self
            .identity_key()
            .ok_or(ResourceError::MissingIdentity {
                operation: "open a detail endpoint of",
            })?;
        let endpoint = self.live_endpoint("open a detail endpoint")?;

        let base = self
            .url()
            .map_or_else(|| endpoint.detail_url(&id), ToString::to_string);
        let url = format!("{}/{}/", base.trim_end_matches('/'), name.replace('_', "-"));

        Ok(DetailEndpoint::new(
            endpoint.client().clone(),
            url,
            name,
            detail_model(name),
        ))
    }

    /// Traces the cable path starting at this record.
    ///
    /// Works on interfaces, console, power and pass-through ports and power
    /// feeds. Each segment's records are typed by the endpoint their `url`
    /// names.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`detail_endpoint`](Self::detail_endpoint), or
    /// the error of the trace request.
    pub async fn trace(&self) -> Result<Vec<CableSegment>, ResourceError> {
        self.detail_endpoint("trace")?.trace().await
    }

    /// Returns every attribute as JSON, nested records expanded in full.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn live_endpoint(&self, operation: &'static str) -> Result<Endpoint, ResourceError> {
        self.endpoint
            .as_ref()
            .and_then(EndpointHandle::upgrade)
            .ok_or_else(|| ResourceError::EndpointUnavailable {
                record: self.describe(),
                operation,
            })
    }

    fn attribute_not_found(&self, field: &str) -> ResourceError {
        ResourceError::AttributeNotFound {
            record: self.describe(),
            field: field.to_string(),
        }
    }

    fn describe(&self) -> String {
        let text = self.to_string();
        if !text.is_empty() {
            return text;
        }
        self.identity_key().map_or_else(
            || self.model.name.to_string(),
            |id| format!("{} #{id}", self.model.name),
        )
    }
}

/// Handle parsed from the record's own `url`, through the client of `parent`.
fn own_handle(values: &Value, parent: Option<&EndpointHandle>) -> Option<EndpointHandle> {
    let url = values.get("url").and_then(Value::as_str)?;
    let parent = parent?;
    let handle = parent.with_url(url);
    if handle.is_none() && parent.is_alive() {
        tracing::warn!(url = %url, "Record URL does not map to an endpoint");
    }
    handle
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .model
            .display
            .and_then(|display| display(self))
            .or_else(|| default_display(self))
            .unwrap_or_default();
        f.write_str(&text)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint.as_ref().map(EndpointHandle::name)
            == other.endpoint.as_ref().map(EndpointHandle::name)
            && self.identity() == other.identity()
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.endpoint.as_ref().map(EndpointHandle::name).hash(state);
        self.identity_key().hash(state);
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
