//! Evaluating filter trees against service documents.
//!
//! A [`Record`] exposes the string values stored under a field; a literal
//! holds when any of them contains the literal value, ignoring case. A
//! field without values never matches a literal.

use serde_json::Value;

use crate::ast::FilterNode;
use crate::keys::KeySet;

/// A document that can be filtered.
pub trait Record {
    /// String values stored under `field`. Empty when the field is missing.
    fn values(&self, field: &str) -> Vec<String>;
}

/// JSON objects: strings as-is, numbers and booleans as JSON text, arrays
/// element by element. Nulls and nested objects carry no values.
impl Record for Value {
    fn values(&self, field: &str) -> Vec<String> {
        match self.get(field) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            Some(other) => scalar_text(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Trait for testing a record against a filter.
pub trait Matches {
    /// Whether `record` satisfies this filter. `keys` maps filter keys to fields.
    fn matches<R: Record + ?Sized>(&self, record: &R, keys: &KeySet) -> bool;
}

impl Matches for FilterNode {
    fn matches<R: Record + ?Sized>(&self, record: &R, keys: &KeySet) -> bool {
        match self {
            FilterNode::Literal { key, value } => {
                let Some(field) = keys.field(key) else {
                    return false;
                };
                let needle = value.to_lowercase();
                record
                    .values(field)
                    .iter()
                    .any(|v| v.to_lowercase().contains(&needle))
            }
            FilterNode::And { left, right } => {
                left.matches(record, keys) && right.matches(record, keys)
            }
            FilterNode::Or { left, right } => {
                left.matches(record, keys) || right.matches(record, keys)
            }
            FilterNode::Not { child } => !child.matches(record, keys),
        }
    }
}

/// Records matching `node`, in their original order.
pub fn filter_records<'r, R: Record>(
    node: &FilterNode,
    records: &'r [R],
    keys: &KeySet,
) -> Vec<&'r R> {
    records.iter().filter(|r| node.matches(*r, keys)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    fn services() -> Vec<Value> {
        vec![
            json!({ "name": "billing-api", "tags": ["payments", "public"], "owner": "team-money" }),
            json!({ "name": "ledger", "tags": ["payments"], "owner": "team-money", "lifecycle": "deprecated" }),
            json!({ "name": "search", "tags": [], "owner": null }),
        ]
    }

    fn names(records: Vec<&Value>) -> Vec<&str> {
        records
            .into_iter()
            .filter_map(|r| r["name"].as_str())
            .collect()
    }

    #[test]
    fn test_json_values() {
        let record = json!({ "tags": ["a", 1, true, null, {"x": 1}], "port": 8080, "owner": null });
        assert_eq!(record.values("tags"), vec!["a", "1", "true"]);
        assert_eq!(record.values("port"), vec!["8080"]);
        assert!(record.values("owner").is_empty());
        assert!(record.values("missing").is_empty());
        assert!(json!("not an object").values("name").is_empty());
    }

    #[test]
    fn test_literal_maps_key_to_field() {
        let keys = KeySet::default();
        let records = services();
        let node = parse("tag:PAY", &keys).unwrap();
        assert_eq!(
            names(filter_records(&node, &records, &keys)),
            vec!["billing-api", "ledger"]
        );
    }

    #[test]
    fn test_boolean_operators() {
        let keys = KeySet::default();
        let records = services();

        let node = parse("tag:payments NOT lifecycle:deprecated", &keys).unwrap();
        assert_eq!(names(filter_records(&node, &records, &keys)), vec!["billing-api"]);

        let node = parse("name:search OR tag:public", &keys).unwrap();
        assert_eq!(
            names(filter_records(&node, &records, &keys)),
            vec!["billing-api", "search"]
        );
    }

    #[test]
    fn test_missing_field_never_matches() {
        let keys = KeySet::default();
        let records = services();

        let node = parse("owner:team", &keys).unwrap();
        assert_eq!(
            names(filter_records(&node, &records, &keys)),
            vec!["billing-api", "ledger"]
        );

        let node = parse("NOT owner:team", &keys).unwrap();
        assert_eq!(names(filter_records(&node, &records, &keys)), vec!["search"]);
    }

    #[test]
    fn test_unknown_key_in_hand_built_tree() {
        let node = FilterNode::literal("color", "red");
        assert!(!node.matches(&json!({ "color": "red" }), &KeySet::default()));
    }
}
