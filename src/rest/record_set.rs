//! Lazy, paginated sets of records.

use std::collections::VecDeque;

use futures::stream::{self, Stream};
use serde_json::Value;

use crate::clients::Pager;
use crate::rest::coercion::FieldValue;
use crate::rest::endpoint::Endpoint;
use crate::rest::record::Record;
use crate::rest::ResourceError;

/// The result of a list request, consumed one record at a time.
///
/// Pages are fetched as the set is consumed, so a set can only be walked
/// once. Build a new one from the [`Endpoint`] to start over.
///
/// # Example
///
/// ```rust,ignore
/// use futures::TryStreamExt;
/// use netbox_api::rest::Query;
///
/// let interfaces = api.dcim().endpoint("interfaces");
///
/// // Count without downloading every page
/// let mut set = interfaces.filter(Query::new().param("device", "edge-1"))?;
/// println!("{} interfaces", set.len().await?);
///
/// // Or walk it as a stream
/// let names: Vec<String> = interfaces
///     .all(Query::new())
///     .into_stream()
///     .map_ok(|record| record.to_string())
///     .try_collect()
///     .await?;
///
/// // Disable every matching interface in one request
/// interfaces
///     .filter(Query::new().param("device", "edge-1"))?
///     .update([("enabled", false)])
///     .await?;
/// ```
#[derive(Debug)]
pub struct RecordSet {
    endpoint: Endpoint,
    pager: Pager,
    buffer: VecDeque<Value>,
    yielded: u64,
}

impl RecordSet {
    pub(crate) fn new(endpoint: Endpoint, pager: Pager) -> Self {
        Self {
            endpoint,
            pager,
            buffer: VecDeque::new(),
            yielded: 0,
        }
    }

    /// Returns the endpoint the records belong to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the next record, fetching another page when needed.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if a page request fails.
    pub async fn next(&mut self) -> Result<Option<Record>, ResourceError> {
        let values = match self.buffer.pop_front() {
            Some(values) => Some(values),
            None => self.pager.next_item().await.map_err(|e| self.map_error(e))?,
        };

        match values {
            Some(values) => {
                self.yielded += 1;
                self.endpoint.wrap_one(values).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Returns the total size of the set.
    ///
    /// Uses the count the server reports with the first page. When the
    /// server sends none, every remaining page is fetched and buffered.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if a page request fails.
    pub async fn len(&mut self) -> Result<u64, ResourceError> {
        if let Some(count) = self.pager.count().await.map_err(|e| self.map_error(e))? {
            return Ok(count);
        }

        while let Some(values) = self.pager.next_item().await.map_err(|e| self.map_error(e))? {
            self.buffer.push_back(values);
        }
        Ok(self.yielded + self.buffer.len() as u64)
    }

    /// Returns `true` if the set holds no records.
    ///
    /// # Errors
    ///
    /// See [`len`](Self::len).
    pub async fn is_empty(&mut self) -> Result<bool, ResourceError> {
        Ok(self.len().await? == 0)
    }

    /// Consumes the set and returns every remaining record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if a page request fails.
    pub async fn collect_all(mut self) -> Result<Vec<Record>, ResourceError> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// Turns the set into a stream of records.
    ///
    /// The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record, ResourceError>> {
        stream::unfold(Some(self), |state| async move {
            let mut set = state?;
            match set.next().await {
                Ok(Some(record)) => Some((Ok(record), Some(set))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Assigns the given fields on every record and sends the changed
    /// records in one bulk update.
    ///
    /// Returns `Ok(false)` without sending anything if no record changed.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if a page or the bulk request fails.
    pub async fn update<I, K, V>(self, values: I) -> Result<bool, ResourceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let values: Vec<(String, FieldValue)> = values
            .into_iter()
            .map(|(field, value)| (field.into(), value.into()))
            .collect();

        let endpoint = self.endpoint.clone();
        let mut records = self.collect_all().await?;
        for record in &mut records {
            for (field, value) in &values {
                record.set(field.clone(), value.clone());
            }
        }
        endpoint.update_records(&mut records).await
    }

    /// Deletes every record of the set in one bulk request.
    ///
    /// Returns `Ok(false)` without sending anything if the set is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentity`] if a record has no id, or
    /// the error of a page or the bulk request.
    pub async fn delete(self) -> Result<bool, ResourceError> {
        let endpoint = self.endpoint.clone();
        let ids = self
            .collect_all()
            .await?
            .iter()
            .map(|record| {
                record
                    .identity()
                    .cloned()
                    .ok_or(ResourceError::MissingIdentity { operation: "delete" })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            tracing::debug!(endpoint = %endpoint.name(), "Nothing to delete");
            return Ok(false);
        }
        endpoint.bulk_delete(ids).await
    }

    fn map_error(&self, error: crate::clients::HttpError) -> ResourceError {
        ResourceError::from_http_error(error, self.endpoint.name(), None)
    }
}
