//! Form Definition Model
//!
//! Declarative description of a multi-step form: the field set with its
//! per-field rules, and the ordered steps that partition it.
//!
//! # Example YAML Format
//!
//! ```yaml
//! name: agent
//! fields:
//!   - name: agent_name
//!     label: Agent name
//!     required: true
//!     max_length: 100
//!   - name: opening_time
//!     required: true
//!     pattern: "([01][0-9]|2[0-3]):[0-5][0-9]"
//!   - name: closing_time
//!     required: true
//!     pattern: "([01][0-9]|2[0-3]):[0-5][0-9]"
//!
//! steps:
//!   - title: Basic information
//!     required: [agent_name]
//!   - title: Operating hours
//!     required: [opening_time, closing_time]
//!     checks:
//!       - rule: range_order
//!         start: opening_time
//!         end: closing_time
//! ```

use serde::{Deserialize, Serialize};

/// A single form field and its validation rules.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Identifier used by steps and checks
    pub name: String,

    /// Human-readable label used in warnings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Value must be present
    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Regular expression the whole value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Inclusive numeric lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Inclusive numeric upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FieldSpec {
    /// Creates an optional field with no rules.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            label: None,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            min: None,
            max: None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets inclusive numeric bounds.
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Returns the label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// A rule spanning several fields, attached to a step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CrossFieldRule {
    /// `start` must be strictly less than `end` when both are filled in.
    RangeOrder { start: String, end: String },

    /// When `toggle` is on, every field in `fields` becomes required.
    RequiredWhen { toggle: String, fields: Vec<String> },
}

impl CrossFieldRule {
    /// Field names this rule reads.
    pub fn referenced_fields(&self) -> Vec<&str> {
        match self {
            Self::RangeOrder { start, end } => vec![start.as_str(), end.as_str()],
            Self::RequiredWhen { toggle, fields } => std::iter::once(toggle.as_str())
                .chain(fields.iter().map(String::as_str))
                .collect(),
        }
    }
}

/// One step of a form definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepSpec {
    pub title: String,

    /// Fields that must be valid before leaving this step
    #[serde(default)]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CrossFieldRule>,
}

impl StepSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            required: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Adds required field names.
    pub fn require<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_check(mut self, rule: CrossFieldRule) -> Self {
        self.checks.push(rule);
        self
    }
}

/// A complete multi-step form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FormDefinition {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub steps: Vec<StepSpec>,
}

impl FormDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_step(mut self, step: StepSpec) -> Self {
        self.steps.push(step);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
