//! Path building for endpoints and records.
//!
//! Endpoint paths are relative to the API root:
//!
//! - `{app}/{name}/` for collections (`dcim/devices/`)
//! - `{app}/{name}/{id}/` for single resources
//! - `plugins/{plugin}/{name}/` for plugin collections
//!
//! Endpoint names use underscores in code (`ip_addresses`) and dashes on
//! the wire (`ip-addresses`).
//!
//! Record URLs can also be read back into an `(app, name)` pair, which is how
//! a record built from standalone JSON finds the endpoint it belongs to.
//!
//! # Example
//!
//! ```rust
//! use netbox_api::rest::{build_path, detail_path, parse_record_url};
//!
//! assert_eq!(build_path("ipam", "ip_addresses"), "ipam/ip-addresses/");
//! assert_eq!(detail_path("dcim", "devices", 7), "dcim/devices/7/");
//!
//! let parsed = parse_record_url("/api", "https://netbox.example.com/api/ipam/ip-addresses/9/");
//! assert_eq!(parsed, Some(("ipam".to_string(), "ip_addresses".to_string())));
//! ```

use std::fmt::Display;

use crate::rest::models::normalize_name;

/// Builds the collection path for an endpoint.
#[must_use]
pub fn build_path(app: &str, name: &str) -> String {
    format!("{}/{}/", app.trim_matches('/'), name.replace('_', "-"))
}

/// Builds the path of a single resource in an endpoint.
#[must_use]
pub fn detail_path<V: Display>(app: &str, name: &str, id: V) -> String {
    format!("{}{id}/", build_path(app, name))
}

/// Reads the `(app, endpoint)` pair out of a record URL.
///
/// `base_path` is the path of the API root (e.g. `/api` or
/// `/netbox/api`). Returns `None` when the URL is not under the API root or
/// does not name an endpoint.
#[must_use]
pub fn parse_record_url(base_path: &str, record_url: &str) -> Option<(String, String)> {
    let path = url::Url::parse(record_url)
        .map(|u| u.path().to_string())
        .ok()
        .or_else(|| record_url.starts_with('/').then(|| record_url.to_string()))?;

    let base_path = base_path.trim_end_matches('/');
    let rest = path.strip_prefix(base_path)?;
    if !rest.starts_with('/') {
        return None;
    }

    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["plugins", plugin, name, ..] => Some((format!("plugins/{plugin}"), normalize_name(name))),
        [app, name, ..] => Some(((*app).to_string(), normalize_name(name))),
        _ => None,
    }
}
