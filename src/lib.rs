//! # NetBox API Rust Client
//!
//! A Rust client for the NetBox REST API, built around change-tracked
//! records that save only what changed.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`NetboxConfig`] and [`NetboxConfigBuilder`]
//! - Validated newtypes for the API root and token
//! - Async HTTP client with retry logic for rate limits and server errors
//! - Records that track changes and send minimal partial updates
//! - Lazy loading of full record details on first access to a missing field
//! - Lazy, paginated record sets with optional parallel page fetching
//! - Bulk update and bulk delete over record sets
//!
//! ## Quick Start
//!
//! ```rust
//! use netbox_api::{Api, ApiToken, BaseUrl, NetboxConfig};
//!
//! let config = NetboxConfig::builder()
//!     .base_url(BaseUrl::new("https://netbox.example.com").unwrap())
//!     .token(ApiToken::new("0123456789abcdef").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let api = Api::new(config).unwrap();
//! let devices = api.dcim().endpoint("devices");
//! assert_eq!(devices.path(), "dcim/devices/");
//! ```
//!
//! ## Reading and Saving Records
//!
//! ```rust,ignore
//! use netbox_api::rest::Query;
//!
//! let interfaces = api.dcim().endpoint("interfaces");
//!
//! let mut eth0 = interfaces
//!     .get_by(Query::new().param("device", "edge-1").param("name", "eth0"))
//!     .await?
//!     .expect("interface exists");
//!
//! // List responses are partial; the first access to a missing field
//! // fetches the full record once
//! let mtu = eth0.attr("mtu").await?.as_i64();
//!
//! eth0.set("description", "uplink");
//! eth0.save().await?;  // PATCH {"description": "uplink"}
//! ```
//!
//! ## Bulk Operations
//!
//! ```rust,ignore
//! use netbox_api::rest::Query;
//!
//! let devices = api.dcim().endpoint("devices");
//!
//! // One PATCH for every changed record, none if nothing changed
//! devices
//!     .filter(Query::new().param("site", "ams1"))?
//!     .update([("status", "planned")])
//!     .await?;
//!
//! // One DELETE with every id
//! devices.filter(Query::new().param("status", "decommissioning"))?.delete().await?;
//! ```
//!
//! ## Design Principles
//!
//! - **Fail-fast validation**: configuration newtypes validate on construction
//! - **Minimal writes**: only fields whose serialized value changed are sent
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

pub use api::{Api, App};

// Re-export public types at crate root for convenience
pub use config::{ApiToken, BaseUrl, NetboxConfig, NetboxConfigBuilder, DEFAULT_MAX_WORKERS};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError, Pager,
};

// Re-export record types
pub use rest::{
    CableSegment, DetailEndpoint, Endpoint, EndpointHandle, FieldValue, ModelRegistry, Query,
    Record, RecordModel, RecordSet, ResourceError,
};
