//! Models for the `dcim` app.

use super::{field_text, FieldKind, RecordModel, IP_ADDRESSES, VLANS};
use crate::rest::coercion::FieldValue;
use crate::rest::record::Record;

pub static DEVICES: RecordModel = RecordModel {
    name: "Devices",
    fields: &[
        ("primary_ip", FieldKind::Nested(&IP_ADDRESSES)),
        ("primary_ip4", FieldKind::Nested(&IP_ADDRESSES)),
        ("primary_ip6", FieldKind::Nested(&IP_ADDRESSES)),
        ("oob_ip", FieldKind::Nested(&IP_ADDRESSES)),
    ],
    display: None,
    nested_return: None,
};

pub static INTERFACES: RecordModel = RecordModel {
    name: "Interfaces",
    fields: &[
        ("untagged_vlan", FieldKind::Nested(&VLANS)),
        ("tagged_vlans", FieldKind::Nested(&VLANS)),
    ],
    display: None,
    nested_return: None,
};

/// One end of a cable: `{"object_type", "object_id", "object"}`.
pub static TERMINATIONS: RecordModel = RecordModel {
    name: "Termination",
    fields: &[],
    display: Some(termination_display),
    nested_return: None,
};

pub static CABLES: RecordModel = RecordModel {
    name: "Cables",
    fields: &[
        ("a_terminations", FieldKind::Nested(&TERMINATIONS)),
        ("b_terminations", FieldKind::Nested(&TERMINATIONS)),
    ],
    display: Some(cable_display),
    nested_return: None,
};

pub static RACKS: RecordModel = RecordModel {
    name: "Racks",
    fields: &[],
    display: None,
    nested_return: None,
};

pub static VIRTUAL_CHASSIS: RecordModel = RecordModel {
    name: "VirtualChassis",
    fields: &[("master", FieldKind::Nested(&DEVICES))],
    display: Some(virtual_chassis_display),
    nested_return: None,
};

pub static SITES: RecordModel = RecordModel {
    name: "Sites",
    fields: &[],
    display: None,
    nested_return: None,
};

fn termination_display(record: &Record) -> Option<String> {
    field_text(record, "object").or_else(|| super::default_display(record))
}

/// `"<a> <> <b>"` for point-to-point cables, `"Cable #<id>"` otherwise.
fn cable_display(record: &Record) -> Option<String> {
    let single_end = |field: &str| match record.get(field) {
        Some(FieldValue::List(items)) if items.len() == 1 => items[0].as_text(),
        _ => None,
    };

    match (single_end("a_terminations"), single_end("b_terminations")) {
        (Some(a), Some(b)) => Some(format!("{a} <> {b}")),
        _ => field_text(record, "id").map(|id| format!("Cable #{id}")),
    }
}

fn virtual_chassis_display(record: &Record) -> Option<String> {
    field_text(record, "master").or_else(|| super::default_display(record))
}
