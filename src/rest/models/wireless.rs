//! Models for the `wireless` app.

use super::{field_text, RecordModel};
use crate::rest::record::Record;

pub static WIRELESS_LANS: RecordModel = RecordModel {
    name: "WirelessLans",
    fields: &[],
    display: Some(ssid_display),
    nested_return: None,
};

fn ssid_display(record: &Record) -> Option<String> {
    field_text(record, "ssid")
}
