//! Models for the `ipam` app.

use super::{field_text, RecordModel};
use crate::rest::record::Record;

pub static IP_ADDRESSES: RecordModel = RecordModel {
    name: "IpAddresses",
    fields: &[],
    display: Some(address_display),
    nested_return: None,
};

pub static PREFIXES: RecordModel = RecordModel {
    name: "Prefixes",
    fields: &[],
    display: Some(prefix_display),
    nested_return: None,
};

pub static AGGREGATES: RecordModel = RecordModel {
    name: "Aggregates",
    fields: &[],
    display: Some(prefix_display),
    nested_return: None,
};

pub static IP_RANGES: RecordModel = RecordModel {
    name: "IpRanges",
    fields: &[],
    display: Some(range_display),
    nested_return: None,
};

pub static VLANS: RecordModel = RecordModel {
    name: "Vlans",
    fields: &[],
    display: None,
    nested_return: None,
};

pub static VLAN_GROUPS: RecordModel = RecordModel {
    name: "VlanGroups",
    fields: &[],
    display: None,
    nested_return: None,
};

fn address_display(record: &Record) -> Option<String> {
    field_text(record, "address")
}

fn prefix_display(record: &Record) -> Option<String> {
    field_text(record, "prefix")
}

fn range_display(record: &Record) -> Option<String> {
    match (
        field_text(record, "start_address"),
        field_text(record, "end_address"),
    ) {
        (Some(start), Some(end)) => Some(format!("{start}-{end}")),
        (start, _) => start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefix_and_aggregate_display() {
        let prefix = Record::with_model(json!({"id": 1, "prefix": "10.0.0.0/8"}), &PREFIXES, None);
        assert_eq!(prefix.to_string(), "10.0.0.0/8");

        let aggregate =
            Record::with_model(json!({"id": 1, "prefix": "192.0.2.0/24"}), &AGGREGATES, None);
        assert_eq!(aggregate.to_string(), "192.0.2.0/24");
    }

    #[test]
    fn test_ip_range_display() {
        let range = Record::with_model(
            json!({"id": 1, "start_address": "10.0.0.10/24", "end_address": "10.0.0.20/24"}),
            &IP_RANGES,
            None,
        );
        assert_eq!(range.to_string(), "10.0.0.10/24-10.0.0.20/24");
    }

    #[test]
    fn test_vlan_uses_default_display() {
        let vlan = Record::with_model(json!({"id": 4, "vid": 100, "name": "users"}), &VLANS, None);
        assert_eq!(vlan.to_string(), "users");
    }
}
