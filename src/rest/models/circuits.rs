//! Models for the `circuits` app.

use super::{field_text, FieldKind, RecordModel};
use crate::rest::record::Record;

pub static CIRCUITS: RecordModel = RecordModel {
    name: "Circuits",
    fields: &[],
    display: Some(circuit_display),
    nested_return: None,
};

pub static CIRCUIT_TERMINATIONS: RecordModel = RecordModel {
    name: "CircuitTerminations",
    fields: &[("circuit", FieldKind::Nested(&CIRCUITS))],
    display: Some(termination_display),
    nested_return: None,
};

fn circuit_display(record: &Record) -> Option<String> {
    field_text(record, "cid")
}

fn termination_display(record: &Record) -> Option<String> {
    field_text(record, "circuit")
}
