//! Models for the `extras` app.

use super::{field_text, FieldKind, RecordModel};
use crate::rest::record::Record;

pub static CONFIG_CONTEXTS: RecordModel = RecordModel {
    name: "ConfigContexts",
    fields: &[("data", FieldKind::Json)],
    display: None,
    nested_return: None,
};

pub static OBJECT_CHANGES: RecordModel = RecordModel {
    name: "ObjectChanges",
    fields: &[
        ("object_data", FieldKind::Json),
        ("prechange_data", FieldKind::Json),
        ("postchange_data", FieldKind::Json),
    ],
    display: Some(request_id_display),
    nested_return: None,
};

pub static TAGS: RecordModel = RecordModel {
    name: "Tags",
    fields: &[],
    display: None,
    nested_return: None,
};

fn request_id_display(record: &Record) -> Option<String> {
    field_text(record, "request_id")
}
