//! Endpoints: the boundary between records and the HTTP transport.
//!
//! An [`Endpoint`] is one collection of the API (`dcim/devices/`). It lists,
//! fetches, creates, updates and deletes records, and it is the only place
//! where record operations turn into HTTP requests.
//!
//! Records do not own their endpoint. They keep an [`EndpointHandle`], which
//! holds a weak reference to the client: dropping the [`Api`](crate::Api)
//! turns pending record operations into
//! [`ResourceError::EndpointUnavailable`] instead of keeping the client
//! alive.
//!
//! A [`DetailEndpoint`] is a sub-resource of one record, such as
//! `ipam/prefixes/{id}/available-ips/`.

use std::fmt::Display;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, Pager};
use crate::rest::models::{normalize_name, RecordModel, GENERIC};
use crate::rest::path::{build_path, detail_path, parse_record_url};
use crate::rest::query::Query;
use crate::rest::record::Record;
use crate::rest::record_set::RecordSet;
use crate::rest::trace::CableSegment;
use crate::rest::ResourceError;

/// A weak reference to an endpoint, carried by every record.
#[derive(Clone, Debug)]
pub struct EndpointHandle {
    client: Weak<HttpClient>,
    app: String,
    name: String,
}

impl EndpointHandle {
    /// Creates a handle for `app`/`name` on `client`.
    #[must_use]
    pub fn new(client: &Arc<HttpClient>, app: impl Into<String>, name: &str) -> Self {
        Self {
            client: Arc::downgrade(client),
            app: app.into(),
            name: normalize_name(name),
        }
    }

    /// Creates a handle from a record URL, if it names an endpoint under the
    /// client's API root.
    #[must_use]
    pub fn from_url(client: &Arc<HttpClient>, url: &str) -> Option<Self> {
        let (app, name) = parse_record_url(client.base_url().path(), url)?;
        Some(Self {
            client: Arc::downgrade(client),
            app,
            name,
        })
    }

    /// Same client, endpoint taken from `url`.
    pub(crate) fn with_url(&self, url: &str) -> Option<Self> {
        let client = self.client()?;
        Self::from_url(&client, url)
    }

    /// Returns the app name, e.g. `dcim` or `plugins/netbox-bgp`.
    #[must_use]
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Returns the endpoint name with underscores, e.g. `ip_addresses`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the client if it is still alive.
    #[must_use]
    pub fn client(&self) -> Option<Arc<HttpClient>> {
        self.client.upgrade()
    }

    /// Returns `true` while the client is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.client.strong_count() > 0
    }

    /// Returns the endpoint if the client is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Endpoint> {
        self.client()
            .map(|client| Endpoint::new(client, self.app.clone(), &self.name))
    }

    /// Returns the model registered for this endpoint on its client.
    pub(crate) fn registered_model(&self) -> Option<&'static RecordModel> {
        self.client()?.models().lookup(&self.app, &self.name)
    }
}

/// One collection of the API.
///
/// # Example
///
/// ```rust,ignore
/// use netbox_api::rest::Query;
///
/// let devices = api.dcim().endpoint("devices");
///
/// let mut active = devices.filter(Query::new().param("status", "active"))?;
/// while let Some(device) = active.next().await? {
///     println!("{device}");
/// }
///
/// let edge = devices.get_by(Query::new().param("name", "edge-1")).await?;
/// ```
#[derive(Clone, Debug)]
pub struct Endpoint {
    client: Arc<HttpClient>,
    app: String,
    name: String,
    model: &'static RecordModel,
}

// Verify Endpoint is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Endpoint>();
    assert_send_sync::<EndpointHandle>();
    assert_send_sync::<DetailEndpoint>();
};

impl Endpoint {
    /// Creates an endpoint. The record model comes from the client's
    /// registry, falling back to the generic model.
    #[must_use]
    pub fn new(client: Arc<HttpClient>, app: impl Into<String>, name: &str) -> Self {
        let app = app.into();
        let name = normalize_name(name);
        let model = client.models().model_for(&app, &name);
        Self {
            client,
            app,
            name,
            model,
        }
    }

    /// Overrides the record model.
    #[must_use]
    pub const fn with_model(mut self, model: &'static RecordModel) -> Self {
        self.model = model;
        self
    }

    /// Returns the app name.
    #[must_use]
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Returns the endpoint name with underscores.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the model used for records of this endpoint.
    #[must_use]
    pub const fn model(&self) -> &'static RecordModel {
        self.model
    }

    /// Returns the HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Returns the collection path relative to the API root.
    #[must_use]
    pub fn path(&self) -> String {
        build_path(&self.app, &self.name)
    }

    /// Returns the absolute collection URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.client.url_for(&self.path())
    }

    /// Returns the absolute URL of one resource.
    #[must_use]
    pub fn detail_url(&self, id: &str) -> String {
        self.client.url_for(&detail_path(&self.app, &self.name, id))
    }

    /// Returns a weak handle to this endpoint.
    #[must_use]
    pub fn handle(&self) -> EndpointHandle {
        EndpointHandle::new(&self.client, self.app.clone(), &self.name)
    }

    /// Lists every record, optionally narrowed by `query`.
    ///
    /// Nothing is fetched until the set is consumed.
    #[must_use]
    pub fn all(&self, query: Query) -> RecordSet {
        let pager = Pager::new(Arc::clone(&self.client), self.path(), query.into_pairs());
        self.wrap_many(pager)
    }

    /// Lists the records matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidQuery`] for an empty query; use
    /// [`all`](Self::all) to list everything.
    pub fn filter(&self, query: Query) -> Result<RecordSet, ResourceError> {
        if query.is_empty() {
            return Err(ResourceError::InvalidQuery {
                message: "filter() requires at least one parameter; use all() to list everything"
                    .to_string(),
            });
        }
        Ok(self.all(query))
    }

    /// Fetches one record by id. Returns `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for any failure other than a 404.
    pub async fn get(&self, id: impl Display) -> Result<Option<Record>, ResourceError> {
        let id = id.to_string();
        match self.get_one(&id).await {
            Ok(values) => {
                let mut record = self.wrap_one(values)?;
                record.mark_full();
                Ok(Some(record))
            }
            Err(ResourceError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetches the single record matching `query`.
    ///
    /// Returns `Ok(None)` if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::AmbiguousLookup`] if more than one record
    /// matches, or [`ResourceError::InvalidQuery`] for an empty query.
    pub async fn get_by(&self, query: Query) -> Result<Option<Record>, ResourceError> {
        let mut matches = self.filter(query)?;
        let count = matches.len().await?;
        if count > 1 {
            return Err(ResourceError::AmbiguousLookup {
                endpoint: self.name.clone(),
                count,
            });
        }
        matches.next().await
    }

    /// Creates one record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ValidationFailed`] if the server rejects the
    /// data.
    pub async fn create(&self, data: Value) -> Result<Record, ResourceError> {
        let response = self
            .send(HttpMethod::Post, &self.path(), Some(data), Vec::new(), None)
            .await?;
        let mut record = self.wrap_one(response.body)?;
        record.mark_full();
        Ok(record)
    }

    /// Creates several records in one request.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ValidationFailed`] if the server rejects any
    /// item.
    pub async fn create_many(&self, data: Vec<Value>) -> Result<Vec<Record>, ResourceError> {
        let response = self
            .send(HttpMethod::Post, &self.path(), Some(Value::Array(data)), Vec::new(), None)
            .await?;
        let mut records = self.wrap_list(response.body)?;
        for record in &mut records {
            record.mark_full();
        }
        Ok(records)
    }

    /// Updates several records in one request.
    ///
    /// Every item must be an object carrying an `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidQuery`] if an item has no id.
    pub async fn update(&self, items: Vec<Value>) -> Result<Vec<Record>, ResourceError> {
        if let Some(item) = items.iter().find(|item| item.get("id").is_none()) {
            return Err(ResourceError::InvalidQuery {
                message: format!("id is missing from object: {item}"),
            });
        }
        let body = self.bulk_patch(items).await?;
        self.wrap_list(body)
    }

    /// Sends the pending changes of `records` in one bulk update.
    ///
    /// Records without changes are left out. Returns `Ok(false)` without
    /// any request if none changed. Sent records are marked clean.
    ///
    /// # Errors
    ///
    /// Returns the error of the bulk request; the records keep their
    /// changes in that case.
    pub async fn update_records(&self, records: &mut [Record]) -> Result<bool, ResourceError> {
        let mut items = Vec::new();
        let mut changed = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let updates = record.updates();
            if updates.is_empty() {
                continue;
            }
            let id = record
                .identity()
                .cloned()
                .ok_or(ResourceError::MissingIdentity { operation: "update" })?;

            let mut item = Map::new();
            item.insert("id".to_string(), id);
            item.extend(updates);
            items.push(Value::Object(item));
            changed.push(index);
        }

        if items.is_empty() {
            tracing::debug!(endpoint = %self.name, "No changes to send in bulk update");
            return Ok(false);
        }

        self.bulk_patch(items).await?;
        for index in changed {
            records[index].mark_clean();
        }
        Ok(true)
    }

    /// Deletes records by id in one request.
    ///
    /// Returns `Ok(false)` without any request if `ids` is empty.
    ///
    /// # Errors
    ///
    /// Returns the error of the bulk request.
    pub async fn delete_many<I, V>(&self, ids: I) -> Result<bool, ResourceError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let ids: Vec<Value> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Ok(false);
        }
        self.bulk_delete(ids).await
    }

    /// Returns the number of records matching `query`.
    ///
    /// Asks for a single-item page and reads its `count`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the response has no
    /// count.
    pub async fn count(&self, query: Query) -> Result<u64, ResourceError> {
        let mut pairs: Vec<(String, String)> = query
            .into_pairs()
            .into_iter()
            .filter(|(k, _)| k != "limit")
            .collect();
        pairs.push(("limit".to_string(), "1".to_string()));

        let response = self
            .send(HttpMethod::Get, &self.path(), None, pairs, None)
            .await?;
        response
            .body
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                HttpError::Content {
                    message: format!("no count in response from {}", self.path()),
                }
                .into()
            })
    }

    /// Returns the allowed values of every choice field, read from the
    /// endpoint's OPTIONS metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the metadata has no
    /// `actions.POST` section.
    pub async fn choices(&self) -> Result<IndexMap<String, Vec<Value>>, ResourceError> {
        let response = self
            .send(HttpMethod::Options, &self.path(), None, Vec::new(), None)
            .await?;

        let post = response
            .body
            .pointer("/actions/POST")
            .and_then(Value::as_object)
            .ok_or_else(|| HttpError::Content {
                message: format!("unexpected format in the OPTIONS response of {}", self.path()),
            })?;

        Ok(post
            .iter()
            .filter_map(|(field, meta)| {
                meta.get("choices")
                    .and_then(Value::as_array)
                    .map(|choices| (field.clone(), choices.clone()))
            })
            .collect())
    }

    /// Fetches the JSON of one resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for a 404.
    pub async fn get_one(&self, id: &str) -> Result<Value, ResourceError> {
        let path = detail_path(&self.app, &self.name, id);
        let response = self
            .send(HttpMethod::Get, &path, None, Vec::new(), Some(id))
            .await?;
        Ok(response.body)
    }

    /// Partially updates one resource and returns the server's JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ValidationFailed`] if the server rejects the
    /// update.
    pub async fn patch(&self, id: &str, fields: Map<String, Value>) -> Result<Value, ResourceError> {
        tracing::debug!(endpoint = %self.name, id = %id, fields = ?fields.keys().collect::<Vec<_>>(), "Saving record");
        let path = detail_path(&self.app, &self.name, id);
        let response = self
            .send(HttpMethod::Patch, &path, Some(Value::Object(fields)), Vec::new(), Some(id))
            .await?;
        Ok(response.body)
    }

    /// Deletes one resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the resource does not exist.
    pub async fn delete_one(&self, id: &str) -> Result<bool, ResourceError> {
        let path = detail_path(&self.app, &self.name, id);
        let response = self
            .send(HttpMethod::Delete, &path, None, Vec::new(), Some(id))
            .await?;
        Ok(response.is_ok())
    }

    /// Sends a bulk partial update and returns the server's JSON.
    ///
    /// # Errors
    ///
    /// Returns the error of the request.
    pub async fn bulk_patch(&self, items: Vec<Value>) -> Result<Value, ResourceError> {
        tracing::debug!(endpoint = %self.name, count = items.len(), "Sending bulk update");
        let response = self
            .send(HttpMethod::Patch, &self.path(), Some(Value::Array(items)), Vec::new(), None)
            .await?;
        Ok(response.body)
    }

    /// Sends a bulk delete for the given ids.
    ///
    /// # Errors
    ///
    /// Returns the error of the request.
    pub async fn bulk_delete(&self, ids: Vec<Value>) -> Result<bool, ResourceError> {
        tracing::debug!(endpoint = %self.name, count = ids.len(), "Sending bulk delete");
        let body: Vec<Value> = ids
            .into_iter()
            .map(|id| serde_json::json!({ "id": id }))
            .collect();
        let response = self
            .send(HttpMethod::Delete, &self.path(), Some(Value::Array(body)), Vec::new(), None)
            .await?;
        Ok(response.is_ok())
    }

    /// Wraps the JSON of one resource into a partial record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] if `values` is not an object.
    pub fn wrap_one(&self, values: Value) -> Result<Record, ResourceError> {
        if !values.is_object() {
            return Err(HttpError::Content {
                message: format!("expected an object from {}, got {values}", self.path()),
            }
            .into());
        }
        Ok(Record::with_model(values, self.model, Some(self.handle())))
    }

    fn wrap_list(&self, values: Value) -> Result<Vec<Record>, ResourceError> {
        match values {
            Value::Array(items) => items.into_iter().map(|v| self.wrap_one(v)).collect(),
            other => Ok(vec![self.wrap_one(other)?]),
        }
    }

    /// Wraps a pager into a lazy record set of this endpoint.
    #[must_use]
    pub fn wrap_many(&self, pager: Pager) -> RecordSet {
        RecordSet::new(self.clone(), pager)
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        query: Vec<(String, String)>,
        id: Option<&str>,
    ) -> Result<HttpResponse, ResourceError> {
        send(&self.client, method, path, body, query)
            .await
            .map_err(|e| ResourceError::from_http_error(e, &self.name, id))
    }
}

async fn send(
    client: &HttpClient,
    method: HttpMethod,
    path: &str,
    body: Option<Value>,
    query: Vec<(String, String)>,
) -> Result<HttpResponse, HttpError> {
    let mut builder = HttpRequest::builder(method, path).query(query);
    if let Some(body) = body {
        builder = builder.body(body);
    }
    client.request(builder.build()?).await
}

/// A sub-resource of one record, such as `available-ips`.
///
/// # Example
///
/// ```rust,ignore
/// use netbox_api::rest::Query;
/// use serde_json::json;
///
/// let prefix = api.ipam().endpoint("prefixes").get(3).await?.expect("prefix exists");
/// let available = prefix.detail_endpoint("available-ips")?;
///
/// let free = available.list(Query::new().limit(10)).await?;
/// let allocated = available.create(json!({"description": "gateway"})).await?;
/// ```
#[derive(Clone, Debug)]
pub struct DetailEndpoint {
    client: Arc<HttpClient>,
    url: String,
    name: String,
    model: &'static RecordModel,
}

impl DetailEndpoint {
    pub(crate) fn new(
        client: Arc<HttpClient>,
        url: String,
        name: &str,
        model: &'static RecordModel,
    ) -> Self {
        Self {
            client,
            url,
            name: normalize_name(name),
            model,
        }
    }

    /// Returns the URL of the sub-resource.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the sub-resource name with underscores.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lists every item of the sub-resource, following pagination.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if a page request fails.
    pub async fn list(&self, query: Query) -> Result<Vec<Record>, ResourceError> {
        let mut pager = Pager::new(Arc::clone(&self.client), self.url.clone(), query.into_pairs());
        let mut records = Vec::new();
        while let Some(values) = pager.next_item().await.map_err(|e| self.map_error(e))? {
            records.push(self.wrap(values));
        }
        Ok(records)
    }

    /// Creates one or more items on the sub-resource.
    ///
    /// A `null` payload is sent as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::AllocationFailed`] if the server answers 409,
    /// which NetBox does when the pool is exhausted.
    pub async fn create(&self, data: Value) -> Result<Vec<Record>, ResourceError> {
        let data = if data.is_null() {
            Value::Object(Map::new())
        } else {
            data
        };

        let response = send(&self.client, HttpMethod::Post, &self.url, Some(data), Vec::new())
            .await
            .map_err(|e| self.map_error(e))?;

        let items = match response.body {
            Value::Array(items) => items,
            other => vec![other],
        };
        Ok(items.into_iter().map(|values| self.wrap(values)).collect())
    }

    /// Fetches the cable path of the parent record.
    pub(crate) async fn trace(&self) -> Result<Vec<CableSegment>, ResourceError> {
        let response = send(&self.client, HttpMethod::Get, &self.url, None, Vec::new())
            .await
            .map_err(|e| self.map_error(e))?;

        let Value::Array(hops) = response.body else {
            return Err(HttpError::Content {
                message: format!("trace from {} is not a list", self.url),
            }
            .into());
        };
        hops.into_iter()
            .map(|hop| {
                CableSegment::from_hop(hop, |values| self.wrap_linked(values)).ok_or_else(|| {
                    ResourceError::from(HttpError::Content {
                        message: format!("malformed hop in trace from {}", self.url),
                    })
                })
            })
            .collect()
    }

    /// Wraps a record of any type, typed by the endpoint its `url` names.
    fn wrap_linked(&self, values: Value) -> Record {
        let handle = values
            .get("url")
            .and_then(Value::as_str)
            .and_then(|url| EndpointHandle::from_url(&self.client, url));
        let model = handle
            .as_ref()
            .and_then(EndpointHandle::registered_model)
            .unwrap_or(&GENERIC);
        Record::with_model(values, model, handle)
    }

    fn wrap(&self, values: Value) -> Record {
        let handle = values
            .get("url")
            .and_then(Value::as_str)
            .and_then(|url| EndpointHandle::from_url(&self.client, url));
        Record::with_model(values, self.model, handle)
    }

    fn map_error(&self, error: HttpError) -> ResourceError {
        match error {
            HttpError::Response(e) if e.code == 409 => {
                let message = serde_json::from_str::<Value>(&e.message)
                    .ok()
                    .and_then(|body| body.get("detail").and_then(Value::as_str).map(String::from))
                    .unwrap_or(e.message);
                ResourceError::AllocationFailed {
                    endpoint: self.name.clone(),
                    message,
                }
            }
            other => ResourceError::from_http_error(other, &self.name, None),
        }
    }
}
