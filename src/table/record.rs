//! Queue Records
//!
//! Wire shapes delivered by the row and agent sources, and the weakly-typed
//! cell value used for schema-less payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record from a disbursement or processing queue.
///
/// `data_json` is a JSON object encoded as a string; its keys depend on the
/// upstream agent configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub id: String,

    #[serde(default)]
    pub agent_id: String,

    #[serde(default)]
    pub data_json: String,

    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RawRecord {
    /// Creates a record with an empty status and no timestamp.
    pub fn new(id: impl Into<String>, agent_id: impl Into<String>, data_json: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent_id: agent_id.into(),
            data_json: data_json.into(),
            status: String::new(),
            created_on: None,
            error: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_created_on(mut self, created_on: DateTime<Utc>) -> Self {
        self.created_on = Some(created_on);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// An `{id, name}` pair from the agent directory source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AgentEntry {
    pub id: String,
    pub name: String,
}

impl AgentEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One page of a paginated list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,

    #[serde(default)]
    pub total_count: usize,

    /// 1-based
    #[serde(default = "default_page_number")]
    pub page_number: usize,

    #[serde(default)]
    pub page_size: usize,
}

fn default_page_number() -> usize {
    1
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: usize, page_number: usize, page_size: usize) -> Self {
        Self {
            items,
            total_count,
            page_number,
            page_size,
        }
    }

    /// A page with no items.
    pub fn empty(page_number: usize, page_size: usize) -> Self {
        Self::new(Vec::new(), 0, page_number, page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages implied by `total_count` and `page_size`.
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    /// True when a later page exists.
    pub fn has_next(&self) -> bool {
        self.page_number < self.page_count()
    }
}

/// A table cell: a scalar from a dynamic payload.
///
/// Nested arrays and objects are kept as their compact JSON text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Text(nested.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}
