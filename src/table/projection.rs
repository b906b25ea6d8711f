//! Dynamic Table Projection
//!
//! Turns a page of records with schema-less JSON payloads into table
//! headers and rows. Columns are discovered from the payloads on the page,
//! so they can differ from one page to the next.
//!
//! Column order: `AgentName` first, then payload keys in the order they are
//! first seen, walking rows top to bottom and each payload in its own key
//! order.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use super::directory::AgentDirectory;
use super::record::{CellValue, RawRecord};

/// Name of the synthetic first column.
pub const AGENT_NAME_COLUMN: &str = "AgentName";

/// Parses a payload string, degrading anything but a JSON object to an
/// empty object.
pub fn parse_payload(data_json: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(data_json) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!("Payload is not an object ({}), treating as empty", kind_of(&other));
            Map::new()
        }
        Err(e) => {
            debug!("Unparseable payload treated as empty: {}", e);
            Map::new()
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ordered column names for one page.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct ColumnHeaderSet(Vec<String>);

impl ColumnHeaderSet {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.0.iter().position(|c| c == column)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ColumnHeaderSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One projected table row.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DynamicRow {
    pub id: String,

    /// Column to cell, `AgentName` first
    pub projected_fields: Map<String, Value>,

    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DynamicRow {
    /// Cell for a column, if this row has it.
    pub fn cell(&self, column: &str) -> Option<CellValue> {
        self.projected_fields.get(column).cloned().map(CellValue::from)
    }

    /// Display name in the `AgentName` column.
    pub fn agent_name(&self) -> &str {
        self.projected_fields
            .get(AGENT_NAME_COLUMN)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Discovers the columns present on a page.
///
/// `AgentName` is always first and appears exactly once, even for an empty
/// page or when a payload carries its own `AgentName` key.
pub fn build_columns(rows: &[RawRecord]) -> ColumnHeaderSet {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = vec![AGENT_NAME_COLUMN.to_string()];
    seen.insert(AGENT_NAME_COLUMN.to_string());

    for row in rows {
        for key in parse_payload(&row.data_json).keys() {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
        }
    }

    debug!("Built {} columns from {} rows", columns.len(), rows.len());
    ColumnHeaderSet(columns)
}

/// Projects every record into a row, resolving `AgentName` through the
/// directory.
///
/// Payload keys follow `AgentName`. A payload that carries its own scalar
/// `AgentName` overrides the resolved value as text, but the column keeps its first
/// position.
pub fn build_rows(rows: &[RawRecord], directory: &AgentDirectory) -> Vec<DynamicRow> {
    rows.iter().map(|row| project_row(row, directory)).collect()
}

/// A payload's own `AgentName`, as text. Null and nested values do not
/// replace the resolved name.
fn agent_name_override(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        scalar => Some(CellValue::from(scalar).to_string()),
    }
}

fn project_row(row: &RawRecord, directory: &AgentDirectory) -> DynamicRow {
    let mut projected_fields = Map::new();
    projected_fields.insert(
        AGENT_NAME_COLUMN.to_string(),
        Value::String(directory.display_name(&row.agent_id)),
    );

    for (key, value) in parse_payload(&row.data_json) {
        if key == AGENT_NAME_COLUMN {
            if let Some(name) = agent_name_override(value) {
                projected_fields.insert(key, Value::String(name));
            }
            continue;
        }
        projected_fields.insert(key, value);
    }

    DynamicRow {
        id: row.id.clone(),
        projected_fields,
        status: row.status.clone(),
        created_on: row.created_on,
        error: row.error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::record::AgentEntry;
    use serde_json::json;

    fn acme_directory() -> AgentDirectory {
        AgentDirectory::from_entries([AgentEntry::new("a1", "Acme")])
    }

    fn keys(row: &DynamicRow) -> Vec<&str> {
        row.projected_fields.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_payload_variants() {
        assert_eq!(parse_payload(r#"{"X":"1"}"#).len(), 1);
        assert!(parse_payload("{not json").is_empty());
        assert!(parse_payload("[1,2,3]").is_empty());
        assert!(parse_payload("42").is_empty());
        assert!(parse_payload("").is_empty());
    }

    #[test]
    fn test_columns_for_empty_page() {
        let columns = build_columns(&[]);
        assert_eq!(columns.as_slice(), ["AgentName"]);
    }

    #[test]
    fn test_columns_agent_name_first_exactly_once() {
        let rows = vec![
            RawRecord::new("r1", "a1", r#"{"Amount":"10","AgentName":"Payload"}"#),
            RawRecord::new("r2", "a1", r#"{"AgentName":"Other","Currency":"NPR"}"#),
        ];
        let columns = build_columns(&rows);

        assert_eq!(columns.position("AgentName"), Some(0));
        assert_eq!(columns.iter().filter(|c| *c == "AgentName").count(), 1);
        assert_eq!(columns.into_vec(), vec!["AgentName", "Amount", "Currency"]);
    }

    #[test]
    fn test_columns_first_seen_order() {
        let rows = vec![
            RawRecord::new("r1", "a1", r#"{"Zeta":1,"Alpha":2}"#),
            RawRecord::new("r2", "a1", r#"{"Beta":3,"Zeta":4}"#),
            RawRecord::new("r3", "a1", r#"{"Alpha":5,"Gamma":6}"#),
        ];
        let columns = build_columns(&rows);
        assert_eq!(columns.as_slice(), ["AgentName", "Zeta", "Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_columns_skip_malformed_payload() {
        let rows = vec![
            RawRecord::new("r1", "a1", "{not json"),
            RawRecord::new("r2", "a1", r#"{"Y":"2"}"#),
        ];
        assert_eq!(build_columns(&rows).as_slice(), ["AgentName", "Y"]);
    }

    #[test]
    fn test_rows_malformed_payload_keeps_row() {
        let rows = vec![RawRecord::new("r1", "abcdef1234567890", "{not json")];
        let projected = build_rows(&rows, &acme_directory());

        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].projected_fields.len(), 1);
        assert_eq!(projected[0].agent_name(), "Agent-abcdef12");
    }

    #[test]
    fn test_rows_resolved_and_placeholder() {
        let rows = vec![
            RawRecord::new("r1", "A1", "{}"),
            RawRecord::new("r2", "abcdef1234567890", "{}"),
        ];
        let projected = build_rows(&rows, &acme_directory());

        assert_eq!(projected[0].agent_name(), "Acme");
        assert_eq!(projected[1].agent_name(), "Agent-abcdef12");
    }

    #[test]
    fn test_directory_and_rows_scenario() {
        let rows = vec![
            RawRecord::new("r1", "a1", r#"{"X":"1"}"#),
            RawRecord::new("r2", "zzz", r#"{"Y":"2"}"#),
        ];
        let directory = acme_directory();

        assert_eq!(build_columns(&rows).as_slice(), ["AgentName", "X", "Y"]);

        let projected = build_rows(&rows, &directory);
        assert_eq!(
            Value::Object(projected[0].projected_fields.clone()),
            json!({"AgentName": "Acme", "X": "1"})
        );
        assert_eq!(
            Value::Object(projected[1].projected_fields.clone()),
            json!({"AgentName": "Agent-zzz", "Y": "2"})
        );
        assert_eq!(keys(&projected[0]), vec!["AgentName", "X"]);
    }

    #[test]
    fn test_payload_agent_name_overrides_value_not_position() {
        let rows = vec![RawRecord::new("r1", "a1", r#"{"Amount":5,"AgentName":"From payload"}"#)];
        let projected = build_rows(&rows, &acme_directory());

        assert_eq!(keys(&projected[0]), vec!["AgentName", "Amount"]);
        assert_eq!(projected[0].agent_name(), "From payload");
    }

    #[test]
    fn test_non_string_payload_agent_name() {
        let rows = vec![
            RawRecord::new("r1", "a1", r#"{"AgentName":42,"X":"1"}"#),
            RawRecord::new("r2", "a1", r#"{"AgentName":null}"#),
            RawRecord::new("r3", "a1", r#"{"AgentName":{"first":"A"}}"#),
        ];
        let projected = build_rows(&rows, &acme_directory());

        assert_eq!(projected[0].agent_name(), "42");
        assert_eq!(keys(&projected[0]), vec!["AgentName", "X"]);
        assert_eq!(projected[1].agent_name(), "Acme");
        assert_eq!(projected[2].agent_name(), "Acme");
    }

    #[test]
    fn test_projection_is_idempotent() {
        let rows = vec![
            RawRecord::new("r1", "a1", r#"{"B":1,"A":2}"#),
            RawRecord::new("r2", "x", "oops"),
        ];
        let directory = acme_directory();

        assert_eq!(build_columns(&rows), build_columns(&rows));
        assert_eq!(build_rows(&rows, &directory), build_rows(&rows, &directory));
    }

    #[test]
    fn test_row_passes_through_metadata() {
        let rows = vec![RawRecord::new("r9", "a1", "{}")
            .with_status("Failed")
            .with_error("Beneficiary bank rejected")];
        let projected = build_rows(&rows, &acme_directory());

        assert_eq!(projected[0].id, "r9");
        assert_eq!(projected[0].status, "Failed");
        assert_eq!(projected[0].error.as_deref(), Some("Beneficiary bank rejected"));
    }

    #[test]
    fn test_cell_lookup() {
        let rows = vec![RawRecord::new("r1", "a1", r#"{"Amount":250,"Ok":true}"#)];
        let row = &build_rows(&rows, &acme_directory())[0];

        assert_eq!(row.cell("Amount").unwrap().to_string(), "250");
        assert_eq!(row.cell("Ok"), Some(CellValue::Bool(true)));
        assert!(row.cell("Missing").is_none());
    }
}
