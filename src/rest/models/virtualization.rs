//! Models for the `virtualization` app.

use super::{FieldKind, RecordModel, IP_ADDRESSES, VLANS};

pub static VIRTUAL_MACHINES: RecordModel = RecordModel {
    name: "VirtualMachines",
    fields: &[
        ("primary_ip", FieldKind::Nested(&IP_ADDRESSES)),
        ("primary_ip4", FieldKind::Nested(&IP_ADDRESSES)),
        ("primary_ip6", FieldKind::Nested(&IP_ADDRESSES)),
    ],
    display: None,
    nested_return: None,
};

pub static VM_INTERFACES: RecordModel = RecordModel {
    name: "VmInterfaces",
    fields: &[
        ("untagged_vlan", FieldKind::Nested(&VLANS)),
        ("tagged_vlans", FieldKind::Nested(&VLANS)),
    ],
    display: None,
    nested_return: None,
};
