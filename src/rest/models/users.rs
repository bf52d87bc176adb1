//! Models for the `users` app.

use super::{field_text, RecordModel};
use crate::rest::record::Record;

pub static USERS: RecordModel = RecordModel {
    name: "Users",
    fields: &[],
    display: Some(username_display),
    nested_return: None,
};

fn username_display(record: &Record) -> Option<String> {
    field_text(record, "username")
}
