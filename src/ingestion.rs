use crate::error::{Result, StatementTreeError};
use crate::raw::RawRecord;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Object shapes a statement response may take.
#[derive(Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    records: Option<Vec<RawRecord>>,
    #[serde(default)]
    data: Option<Vec<RawRecord>>,
    #[serde(default)]
    d: Option<ODataBody>,
}

#[derive(Deserialize)]
struct ODataBody {
    #[serde(default)]
    results: Option<Vec<RawRecord>>,
}

impl ResponseEnvelope {
    fn into_records(self) -> Result<Vec<RawRecord>> {
        self.records
            .or(self.data)
            .or_else(|| self.d.and_then(|body| body.results))
            .ok_or_else(|| {
                StatementTreeError::UnexpectedPayload(
                    "expected a record list under 'records', 'data' or 'd.results'".to_string(),
                )
            })
    }
}

/// Extracts the record list from a statement response body.
///
/// Accepted shapes: `{"records": [...]}`, `{"data": [...]}`, the raw OData
/// envelope `{"d": {"results": [...]}}`, or a bare array. The first list
/// found in that order wins; a `null` list counts as missing.
///
/// Nesting depth is not limited: the parser grows its stack on the heap
/// instead of stopping at serde_json's recursion limit.
pub fn records_from_json(body: &str) -> Result<Vec<RawRecord>> {
    let records = match body.trim_start().chars().next() {
        Some('[') => parse_unbounded::<Vec<RawRecord>>(body)?,
        Some('{') => parse_unbounded::<ResponseEnvelope>(body)?.into_records()?,
        _ => {
            let value: Value = serde_json::from_str(body)?;
            return Err(StatementTreeError::UnexpectedPayload(format!(
                "expected an array or object, found {}",
                json_type(&value)
            )));
        }
    };

    debug!("Parsed {} top-level statement records", records.len());
    Ok(records)
}

fn parse_unbounded<T: DeserializeOwned>(body: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Same shapes as [`records_from_json`], for a body that is already a
/// [`Value`].
pub fn records_from_value(value: Value) -> Result<Vec<RawRecord>> {
    let records = match value {
        Value::Array(_) => serde_json::from_value::<Vec<RawRecord>>(value)?,
        Value::Object(_) => serde_json::from_value::<ResponseEnvelope>(value)?.into_records()?,
        other => {
            return Err(StatementTreeError::UnexpectedPayload(format!(
                "expected an array or object, found {}",
                json_type(&other)
            )));
        }
    };

    debug!("Parsed {} top-level statement records", records.len());
    Ok(records)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Nests flat records under their `ParentNode`.
///
/// - a record whose parent is missing or not among `records` is a root
/// - when several records share a `HierarchyNode`, the last one receives the
///   children
/// - children already nested in a record are kept; linked ones are appended
///   in input order
/// - records that cannot be reached from a root (parent cycles) are dropped
pub fn link_flat_records(records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut by_id: HashMap<&str, usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        if let Some(id) = record.node_id() {
            by_id.insert(id, idx);
        }
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match record.parent_id().and_then(|parent| by_id.get(parent)) {
            Some(&parent) => children_of[parent].push(idx),
            None => roots.push(idx),
        }
    }

    // Pre-order over everything reachable from a root
    let mut order = Vec::with_capacity(records.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(children_of[idx].iter().rev());
    }

    let total = records.len();
    let mut slots: Vec<Option<RawRecord>> = records.into_iter().map(Some).collect();

    // Reverse pre-order finishes every child before its parent
    for &idx in order.iter().rev() {
        let Some(mut record) = slots[idx].take() else {
            continue;
        };
        for &child in &children_of[idx] {
            if let Some(built) = slots[child].take() {
                record.children.push(built);
            }
        }
        slots[idx] = Some(record);
    }

    let forest: Vec<RawRecord> = roots
        .iter()
        .filter_map(|&idx| slots[idx].take())
        .collect();

    let dropped = total - order.len();
    if dropped > 0 {
        warn!(
            "Dropped {} statement records that are not reachable from any root",
            dropped
        );
    }
    info!(
        "Linked {} statement records into {} roots",
        order.len(),
        forest.len()
    );

    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(id: &str, parent: Option<&str>) -> RawRecord {
        let mut record = RawRecord::default();
        record.hierarchy_node = Some(id.to_string());
        record.parent_node = parent.map(str::to_string);
        record
    }

    fn ids(records: &[RawRecord]) -> Vec<&str> {
        records.iter().filter_map(|r| r.node_id()).collect()
    }

    #[test]
    fn test_records_envelope_shapes() {
        let bodies = [
            json!({ "records": [ { "HierarchyNode": "A" } ] }),
            json!({ "data": [ { "HierarchyNode": "A" } ] }),
            json!({ "d": { "results": [ { "HierarchyNode": "A" } ] } }),
            json!([ { "HierarchyNode": "A" } ]),
        ];

        for body in bodies {
            let records = records_from_json(&body.to_string()).unwrap();
            assert_eq!(ids(&records), vec!["A"]);
        }
    }

    #[test]
    fn test_records_past_default_recursion_limit() {
        let depth = 2_000;
        let mut body = String::from(r#"{"records":["#);
        for i in 0..depth {
            body.push_str(&format!(r#"{{"HierarchyNode":"N{}","Children":["#, i));
        }
        for _ in 0..depth {
            body.push_str("]}");
        }
        body.push_str("]}");

        let records = records_from_json(&body).unwrap();
        assert_eq!(ids(&records), vec!["N0"]);

        let mut depth_seen = 1;
        let mut current = &records[0];
        while let Some(child) = current.children.first() {
            depth_seen += 1;
            current = child;
        }
        assert_eq!(depth_seen, depth);
        assert_eq!(current.node_id(), Some("N1999"));
    }

    #[test]
    fn test_trailing_characters_rejected() {
        let err = records_from_json(r#"[ { "HierarchyNode": "A" } ] ]"#).unwrap_err();
        assert!(matches!(err, StatementTreeError::Serialization(_)));
    }

    #[test]
    fn test_records_prefers_records_key() {
        let body = json!({
            "records": [ { "HierarchyNode": "R" } ],
            "data": [ { "HierarchyNode": "D" } ]
        });
        let records = records_from_value(body).unwrap();
        assert_eq!(ids(&records), vec!["R"]);
    }

    #[test]
    fn test_unexpected_payloads() {
        let err = records_from_json(r#"{ "records": null, "status": "ok" }"#).unwrap_err();
        assert!(matches!(err, StatementTreeError::UnexpectedPayload(_)));

        let err = records_from_json("42").unwrap_err();
        assert!(matches!(err, StatementTreeError::UnexpectedPayload(_)));

        let err = records_from_json("{ not json").unwrap_err();
        assert!(matches!(err, StatementTreeError::Serialization(_)));
    }

    #[test]
    fn test_link_flat_records() {
        let records = vec![
            flat("R1", None),
            flat("G1", Some("R1")),
            flat("L1", Some("G1")),
            flat("G2", Some("R1")),
            flat("L2", Some("G1")),
            flat("X", Some("missing")),
        ];

        let forest = link_flat_records(records);

        assert_eq!(ids(&forest), vec!["R1", "X"]);
        assert_eq!(ids(&forest[0].children), vec!["G1", "G2"]);
        assert_eq!(ids(&forest[0].children[0].children), vec!["L1", "L2"]);
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn test_link_child_before_parent() {
        let records = vec![flat("L1", Some("G1")), flat("G1", Some("R1")), flat("R1", Some(""))];
        let forest = link_flat_records(records);
        assert_eq!(ids(&forest), vec!["R1"]);
        assert_eq!(ids(&forest[0].children[0].children), vec!["L1"]);
    }

    #[test]
    fn test_link_keeps_existing_children() {
        let mut root = flat("R1", None);
        root.children.push(flat("N1", None));
        let forest = link_flat_records(vec![root, flat("G1", Some("R1"))]);
        assert_eq!(ids(&forest[0].children), vec!["N1", "G1"]);
    }

    #[test]
    fn test_link_duplicate_ids_last_wins() {
        let records = vec![flat("G1", None), flat("G1", None), flat("L1", Some("G1"))];
        let forest = link_flat_records(records);
        assert_eq!(forest.len(), 2);
        assert!(forest[0].children.is_empty());
        assert_eq!(ids(&forest[1].children), vec!["L1"]);
    }

    #[test]
    fn test_link_drops_cycles() {
        let records = vec![
            flat("R1", None),
            flat("A", Some("B")),
            flat("B", Some("A")),
            flat("S", Some("S")),
        ];
        let forest = link_flat_records(records);
        assert_eq!(ids(&forest), vec!["R1"]);
        assert!(forest[0].children.is_empty());
    }
}
