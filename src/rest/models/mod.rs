//! Record models and the registry that maps endpoints to them.
//!
//! A [`RecordModel`] is plain configuration data: which fields of a
//! resource hold nested records of a known type, which hold caller-defined
//! JSON that must never be wrapped, and how the record renders as text.
//!
//! [`ModelRegistry`] maps `(app, endpoint)` pairs to models. The default
//! registry covers the built-in NetBox apps; plugins or custom deployments
//! can [`register`](ModelRegistry::register) their own.
//!
//! # Example
//!
//! ```rust
//! use netbox_api::rest::{FieldKind, ModelRegistry, RecordModel, GENERIC};
//!
//! static WIDGETS: RecordModel = RecordModel {
//!     name: "Widgets",
//!     fields: &[("spec_sheet", FieldKind::Json)],
//!     display: None,
//!     nested_return: None,
//! };
//!
//! let mut models = ModelRegistry::default();
//! models.register("plugins/widgets", "widgets", &WIDGETS);
//!
//! assert_eq!(models.model_for("plugins/widgets", "widgets").name, "Widgets");
//! assert_eq!(models.model_for("dcim", "devices").name, "Devices");
//! assert_eq!(models.model_for("dcim", "unknown").name, GENERIC.name);
//! ```

mod circuits;
mod dcim;
mod extras;
mod ipam;
mod users;
mod virtualization;
mod wireless;

pub use circuits::{CIRCUITS, CIRCUIT_TERMINATIONS};
pub use dcim::{CABLES, DEVICES, INTERFACES, RACKS, SITES, TERMINATIONS, VIRTUAL_CHASSIS};
pub use extras::{CONFIG_CONTEXTS, OBJECT_CHANGES, TAGS};
pub use ipam::{AGGREGATES, IP_ADDRESSES, IP_RANGES, PREFIXES, VLANS, VLAN_GROUPS};
pub use users::USERS;
pub use virtualization::{VIRTUAL_MACHINES, VM_INTERFACES};
pub use wireless::WIRELESS_LANS;

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::rest::record::Record;

/// Fields whose value is caller-defined JSON, for every model.
pub const JSON_FIELDS: &[&str] = &["custom_fields", "local_context_data", "config_context"];

/// List fields with set semantics, for every model.
pub const LIST_AS_SET: &[&str] = &["tags", "tagged_vlans"];

/// How a declared field is coerced during record construction.
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Mappings (and mapping elements of lists) become records of this model.
    Nested(&'static RecordModel),
    /// The raw JSON value is stored untouched.
    Json,
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nested(model) => write!(f, "Nested({})", model.name),
            Self::Json => f.write_str("Json"),
        }
    }
}

/// Renders a record as display text.
pub type DisplayFn = fn(&Record) -> Option<String>;

/// Computes the reference value a nested record serializes to when it has
/// neither an `id` nor a `value` field.
pub type NestedReturnFn = fn(&Record) -> Option<Value>;

/// Static description of one resource type.
pub struct RecordModel {
    /// Model name, used in debug output and error messages.
    pub name: &'static str,
    /// Declared field kinds.
    pub fields: &'static [(&'static str, FieldKind)],
    /// Custom display text; `None` falls back to `name`, `label`, `display`.
    pub display: Option<DisplayFn>,
    /// Custom nested reference; see [`NestedReturnFn`].
    pub nested_return: Option<NestedReturnFn>,
}

impl RecordModel {
    /// Returns the declared kind of `field`, if any.
    #[must_use]
    pub fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
    }

    /// Returns `true` if `field` holds caller-defined JSON for this model.
    #[must_use]
    pub fn is_json_field(&self, field: &str) -> bool {
        JSON_FIELDS.contains(&field) || matches!(self.field_kind(field), Some(FieldKind::Json))
    }
}

impl fmt::Debug for RecordModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordModel")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RecordModel {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// The model used when nothing more specific is known.
pub static GENERIC: RecordModel = RecordModel {
    name: "Record",
    fields: &[],
    display: None,
    nested_return: None,
};

/// Returns `true` if `field` is a list field with set semantics.
#[must_use]
pub fn is_list_as_set(field: &str) -> bool {
    LIST_AS_SET.contains(&field)
}

/// Maps `(app, endpoint)` pairs to record models.
///
/// Endpoint names are normalized to use underscores, so `ip-addresses` and
/// `ip_addresses` resolve to the same entry.
#[derive(Clone, Debug)]
pub struct ModelRegistry {
    models: HashMap<(String, String), &'static RecordModel>,
}

impl ModelRegistry {
    /// Creates a registry with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Adds or replaces the model for `(app, name)`.
    pub fn register(&mut self, app: &str, name: &str, model: &'static RecordModel) -> &mut Self {
        self.models
            .insert((app.to_string(), normalize_name(name)), model);
        self
    }

    /// Returns the model registered for `(app, name)`.
    #[must_use]
    pub fn lookup(&self, app: &str, name: &str) -> Option<&'static RecordModel> {
        self.models
            .get(&(app.to_string(), normalize_name(name)))
            .copied()
    }

    /// Returns the model for `(app, name)`, or [`GENERIC`].
    #[must_use]
    pub fn model_for(&self, app: &str, name: &str) -> &'static RecordModel {
        self.lookup(app, name).unwrap_or(&GENERIC)
    }

    /// Returns the number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("dcim", "devices", &DEVICES)
            .register("dcim", "interfaces", &INTERFACES)
            .register("dcim", "cables", &CABLES)
            .register("dcim", "racks", &RACKS)
            .register("dcim", "virtual_chassis", &VIRTUAL_CHASSIS)
            .register("dcim", "sites", &SITES)
            .register("ipam", "ip_addresses", &IP_ADDRESSES)
            .register("ipam", "prefixes", &PREFIXES)
            .register("ipam", "aggregates", &AGGREGATES)
            .register("ipam", "ip_ranges", &IP_RANGES)
            .register("ipam", "vlans", &VLANS)
            .register("ipam", "vlan_groups", &VLAN_GROUPS)
            .register("circuits", "circuits", &CIRCUITS)
            .register("circuits", "circuit_terminations", &CIRCUIT_TERMINATIONS)
            .register("virtualization", "virtual_machines", &VIRTUAL_MACHINES)
            .register("virtualization", "interfaces", &VM_INTERFACES)
            .register("extras", "config_contexts", &CONFIG_CONTEXTS)
            .register("extras", "object_changes", &OBJECT_CHANGES)
            .register("extras", "tags", &TAGS)
            .register("users", "users", &USERS)
            .register("wireless", "wireless_lans", &WIRELESS_LANS);
        registry
    }
}

/// Returns the model for records served by a detail endpoint.
///
/// Allocation endpoints hand out records of a known type; anything else is
/// generic.
#[must_use]
pub fn detail_model(name: &str) -> &'static RecordModel {
    match normalize_name(name).as_str() {
        "available_ips" => &IP_ADDRESSES,
        "available_prefixes" => &PREFIXES,
        "available_vlans" => &VLANS,
        _ => &GENERIC,
    }
}

/// Normalizes an endpoint name to its underscore form.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Default display text: the first non-empty of `name`, `label`, `display`.
#[must_use]
pub fn default_display(record: &Record) -> Option<String> {
    ["name", "label", "display"]
        .iter()
        .find_map(|field| record.get(field).and_then(|value| value.as_text()))
}

/// Display text of a single field, if it is present and not empty.
fn field_text(record: &Record, field: &str) -> Option<String> {
    record.get(field).and_then(|value| value.as_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_builtin_apps() {
        let models = ModelRegistry::default();

        assert_eq!(models.model_for("dcim", "devices").name, "Devices");
        assert_eq!(models.model_for("ipam", "ip-addresses").name, "IpAddresses");
        assert_eq!(models.model_for("ipam", "ip_addresses").name, "IpAddresses");
        assert_eq!(
            models.model_for("virtualization", "interfaces").name,
            "VmInterfaces"
        );
        assert_eq!(models.model_for("dcim", "interfaces").name, "Interfaces");
        assert_eq!(models.model_for("wireless", "wireless-lans").name, "WirelessLans");
    }

    #[test]
    fn test_unknown_endpoint_falls_back_to_generic() {
        let models = ModelRegistry::default();

        assert!(models.lookup("dcim", "power_feeds").is_none());
        assert_eq!(models.model_for("dcim", "power_feeds"), &GENERIC);
    }

    #[test]
    fn test_register_overrides_entry() {
        let mut models = ModelRegistry::default();
        let before = models.len();
        models.register("dcim", "devices", &GENERIC);

        assert_eq!(models.len(), before);
        assert_eq!(models.model_for("dcim", "devices"), &GENERIC);
    }

    #[test]
    fn test_json_fields_are_global_and_declared() {
        assert!(GENERIC.is_json_field("custom_fields"));
        assert!(GENERIC.is_json_field("local_context_data"));
        assert!(!GENERIC.is_json_field("data"));
        assert!(CONFIG_CONTEXTS.is_json_field("data"));
    }

    #[test]
    fn test_field_kind_lookup() {
        assert!(matches!(
            DEVICES.field_kind("primary_ip4"),
            Some(FieldKind::Nested(model)) if model.name == "IpAddresses"
        ));
        assert!(DEVICES.field_kind("serial").is_none());
    }

    #[test]
    fn test_detail_model() {
        assert_eq!(detail_model("available-ips").name, "IpAddresses");
        assert_eq!(detail_model("available_prefixes").name, "Prefixes");
        assert_eq!(detail_model("napalm").name, "Record");
    }

    #[test]
    fn test_list_as_set() {
        assert!(is_list_as_set("tags"));
        assert!(is_list_as_set("tagged_vlans"));
        assert!(!is_list_as_set("vlans"));
    }
}
