//! HTTP request types for the NetBox API client.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! constructing requests against the NetBox REST API.

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the NetBox REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// Retrieve a resource or a list of resources.
    Get,
    /// Create one or more resources.
    Post,
    /// Replace a resource.
    Put,
    /// Partially update one or more resources.
    Patch,
    /// Remove one or more resources.
    Delete,
    /// Describe an endpoint (used to read field choices).
    Options,
}

impl HttpMethod {
    /// Returns `true` for methods that must carry a body.
    #[must_use]
    pub const fn requires_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Patch => write!(f, "patch"),
            Self::Delete => write!(f, "delete"),
            Self::Options => write!(f, "options"),
        }
    }
}

/// An HTTP request to be sent to the NetBox API.
///
/// The path is either relative to the API root (`dcim/devices/`) or an
/// absolute URL taken from a record's `url` field or a `next` link.
///
/// Query parameters are kept as an ordered list of pairs because filters may
/// repeat a key (`?tag=core&tag=edge`).
///
/// # Example
///
/// ```rust
/// use netbox_api::clients::{HttpRequest, HttpMethod};
/// use serde_json::json;
///
/// let get_request = HttpRequest::builder(HttpMethod::Get, "dcim/devices/")
///     .query_param("site", "ams1")
///     .query_param("limit", "50")
///     .build()
///     .unwrap();
/// assert_eq!(get_request.query.len(), 2);
///
/// let patch_request = HttpRequest::builder(HttpMethod::Patch, "dcim/devices/1/")
///     .body(json!({"serial": "ABC123"}))
///     .build()
///     .unwrap();
/// assert!(patch_request.body.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// Path relative to the API root, or an absolute URL.
    pub path: String,
    /// JSON request body, if any.
    pub body: Option<serde_json::Value>,
    /// Query parameters to append to the URL.
    pub query: Vec<(String, String)>,
    /// Additional headers to include in the request.
    pub extra_headers: Option<HashMap<String, String>>,
    /// Number of times to attempt the request (default: 1).
    pub tries: u32,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::MissingBody`] if the method is
    /// `Post`, `Put` or `Patch` and no body was set.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.http_method.requires_body() && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `true` if the path is an absolute URL.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    query: Vec<(String, String)>,
    extra_headers: Option<HashMap<String, String>>,
    tries: u32,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            extra_headers: None,
            tries: 1,
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Appends query parameters.
    #[must_use]
    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the number of times to attempt the request.
    ///
    /// Default is 1 (no retries). Higher values retry 429 and 5xx responses.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            query: self.query,
            extra_headers: self.extra_headers,
            tries: self.tries,
        };
        request.verify()?;
        Ok(request)
    }
}
