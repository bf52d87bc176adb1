//! HTTP client types for NetBox API communication.
//!
//! This module provides the transport layer used by endpoints and records:
//! authenticated requests, retry handling and list pagination.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP client for API communication
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods
//! - [`Pager`]: Lazy cursor over paginated list responses
//! - [`HttpError`]: Unified error type for transport failures
//!
//! # Example
//!
//! ```rust,ignore
//! use netbox_api::{BaseUrl, NetboxConfig};
//! use netbox_api::clients::{HttpClient, HttpMethod, HttpRequest};
//!
//! let config = NetboxConfig::builder()
//!     .base_url(BaseUrl::new("https://netbox.example.com")?)
//!     .build()?;
//! let client = HttpClient::new(config)?;
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "dcim/devices/")
//!     .query_param("site", "ams1")
//!     .build()?;
//!
//! let response = client.request(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! - **429 (Rate Limited)**: Retries using `Retry-After` header value, or 1 second if not present
//! - **5xx (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors (4xx)**: Returns immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries. Configure via
//! [`NetboxConfigBuilder::tries`](crate::NetboxConfigBuilder::tries) or
//! per request with [`HttpRequestBuilder::tries`].

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod pagination;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use pagination::Pager;
