//! Records, endpoints and the change tracking between them.
//!
//! This module provides:
//!
//! - **[`Record`]**: one remote resource, with change tracking, minimal
//!   partial saves and lazy loading of the detail view
//! - **[`FieldValue`]**: the typed value of one record attribute
//! - **[`RecordSet`]**: a lazy, paginated list of records with bulk update
//!   and delete
//! - **[`Endpoint`]** and **[`DetailEndpoint`]**: the HTTP operations behind
//!   records
//! - **[`Query`]**: filter parameters for list requests
//! - **[`CableSegment`]**: one hop of a traced cable path
//! - **[`RecordModel`]** and **[`ModelRegistry`]**: per-endpoint field and
//!   display rules
//! - **[`ResourceError`]**: semantic error types for resource operations
//!
//! # Example
//!
//! ```rust,ignore
//! use netbox_api::rest::Query;
//! use serde_json::json;
//!
//! let cables = api.dcim().endpoint("cables");
//!
//! let mut cable = cables.get(123).await?.expect("cable exists");
//! println!("{cable}");  // "edge-1 > eth0 <> core-1 > eth4"
//!
//! cable.set("tags", json!([11]));
//! cable.save().await?;  // PATCH {"tags": [11]}
//! ```

mod coercion;
mod endpoint;
mod errors;
mod models;
mod path;
mod query;
mod record;
mod record_set;
mod trace;
mod tracking;

pub use coercion::FieldValue;
pub use endpoint::{DetailEndpoint, Endpoint, EndpointHandle};
pub use errors::ResourceError;
pub use models::{
    default_display, detail_model, is_list_as_set, normalize_name, DisplayFn, FieldKind,
    ModelRegistry, NestedReturnFn, RecordModel, AGGREGATES, CABLES, CIRCUITS,
    CIRCUIT_TERMINATIONS, CONFIG_CONTEXTS, DEVICES, GENERIC, INTERFACES, IP_ADDRESSES, IP_RANGES,
    JSON_FIELDS, LIST_AS_SET, OBJECT_CHANGES, PREFIXES, RACKS, SITES, TAGS, TERMINATIONS, USERS,
    VIRTUAL_CHASSIS, VIRTUAL_MACHINES, VLANS, VLAN_GROUPS, VM_INTERFACES, WIRELESS_LANS,
};
pub use path::{build_path, detail_path, parse_record_url};
pub use query::Query;
pub use record::Record;
pub use record_set::RecordSet;
pub use trace::CableSegment;
