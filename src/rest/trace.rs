//! Cable path tracing for interfaces, ports and power feeds.
//!
//! NetBox answers `GET {record}/trace/` with a list of hops, each one a
//! `[near_end, cable, far_end]` triple. Recent versions send lists of
//! terminations for both ends; older ones send single objects.

use serde_json::Value;

use crate::rest::Record;

/// One hop of a cable path.
#[derive(Clone, Debug)]
pub struct CableSegment {
    /// Terminations on the near side.
    pub near_end: Vec<Record>,
    /// The cable joining both sides, absent where the path is open.
    pub cable: Option<Record>,
    /// Terminations on the far side.
    pub far_end: Vec<Record>,
}

impl CableSegment {
    /// Returns `true` if the path stops at this hop.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.cable.is_none() || self.far_end.is_empty()
    }

    /// Builds a segment from one hop, or `None` if it is not a triple.
    pub(crate) fn from_hop<F>(hop: Value, wrap: F) -> Option<Self>
    where
        F: Fn(Value) -> Record,
    {
        let Value::Array(parts) = hop else {
            return None;
        };
        let [near_end, cable, far_end]: [Value; 3] = parts.try_into().ok()?;

        Some(Self {
            near_end: terminations(near_end, &wrap),
            cable: cable.is_object().then(|| wrap(cable)),
            far_end: terminations(far_end, &wrap),
        })
    }
}

fn terminations<F>(value: Value, wrap: &F) -> Vec<Record>
where
    F: Fn(Value) -> Record,
{
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .map(wrap)
            .collect(),
        Value::Object(_) => vec![wrap(value)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(values: Value) -> Record {
        Record::new(values, None)
    }

    #[test]
    fn test_hop_with_termination_lists() {
        let hop = json!([
            [{"id": 1, "name": "eth0"}],
            {"id": 40, "label": "c-40"},
            [{"id": 2, "name": "eth4"}, {"id": 3, "name": "eth5"}]
        ]);

        let segment = CableSegment::from_hop(hop, plain).unwrap();
        assert_eq!(segment.near_end.len(), 1);
        assert_eq!(segment.cable.as_ref().and_then(Record::id), Some(40));
        assert_eq!(segment.far_end.len(), 2);
        assert!(!segment.is_open());
    }

    #[test]
    fn test_hop_with_single_terminations() {
        let hop = json!([{"id": 1, "name": "eth0"}, {"id": 40}, {"id": 2, "name": "eth4"}]);

        let segment = CableSegment::from_hop(hop, plain).unwrap();
        assert_eq!(segment.near_end[0].to_string(), "eth0");
        assert_eq!(segment.far_end[0].to_string(), "eth4");
    }

    #[test]
    fn test_open_path() {
        let hop = json!([[{"id": 1, "name": "eth0"}], null, []]);

        let segment = CableSegment::from_hop(hop, plain).unwrap();
        assert!(segment.cable.is_none());
        assert!(segment.far_end.is_empty());
        assert!(segment.is_open());
    }

    #[test]
    fn test_malformed_hop_is_rejected() {
        assert!(CableSegment::from_hop(json!([{"id": 1}, null]), plain).is_none());
        assert!(CableSegment::from_hop(json!({"id": 1}), plain).is_none());
    }
}
