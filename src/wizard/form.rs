//! Bound Form
//!
//! Runtime form state: the declared fields with compiled rules, the current
//! values and the set of touched fields. Validation messages are only
//! surfaced for touched fields, which is what the wizard marks when a step
//! is submitted.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde_json::{Map, Value};

use super::engine::WizardForm;
use super::model::FieldSpec;
use super::rules::{FieldError, FieldRules};
use crate::error::DefinitionError;

#[derive(Debug, Clone)]
struct FormField {
    name: String,
    label: String,
    rules: FieldRules,
}

/// A form bound to a fixed field set.
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    fields: Vec<FormField>,
    positions: HashMap<String, usize>,
    values: HashMap<String, Value>,
    touched: HashSet<String>,
}

impl Form {
    /// Creates a form with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            positions: HashMap::new(),
            values: HashMap::new(),
            touched: HashSet::new(),
        }
    }

    /// Creates a form from field specs, compiling their rules.
    pub fn from_specs(name: impl Into<String>, specs: &[FieldSpec]) -> Result<Self, DefinitionError> {
        let mut form = Self::new(name);
        for spec in specs {
            form.add_field(spec)?;
        }
        Ok(form)
    }

    /// Adds a field. Field names must be unique.
    pub fn add_field(&mut self, spec: &FieldSpec) -> Result<(), DefinitionError> {
        if self.positions.contains_key(&spec.name) {
            return Err(DefinitionError::DuplicateField(spec.name.clone()));
        }

        let rules = FieldRules::compile(spec)?;
        self.positions.insert(spec.name.clone(), self.fields.len());
        self.fields.push(FormField {
            name: spec.name.clone(),
            label: spec.display_label().to_string(),
            rules,
        });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field(&self, name: &str) -> Option<&FormField> {
        self.positions.get(name).map(|&i| &self.fields[i])
    }

    /// Sets a field value. Returns false for unknown fields.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        if !self.has_field(name) {
            warn!("Form '{}' has no field '{}'", self.name, name);
            return false;
        }
        self.values.insert(name.to_string(), value.into());
        true
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Removes a field's value.
    pub fn clear(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Copies every known key of `values` into the form.
    ///
    /// Returns the number of fields set. Unknown keys are ignored.
    pub fn fill(&mut self, values: &Map<String, Value>) -> usize {
        let mut count = 0;
        for (name, value) in values {
            if self.has_field(name) {
                self.values.insert(name.clone(), value.clone());
                count += 1;
            } else {
                debug!("Ignoring unknown field '{}' for form '{}'", name, self.name);
            }
        }
        count
    }

    /// Current rule violations for a field, touched or not.
    pub fn errors(&self, name: &str) -> Vec<FieldError> {
        match self.field(name) {
            Some(field) => field.rules.check(self.values.get(name)),
            None => Vec::new(),
        }
    }

    /// Violations to show the user: empty until the field is touched.
    pub fn visible_errors(&self, name: &str) -> Vec<FieldError> {
        if self.is_touched(name) {
            self.errors(name)
        } else {
            Vec::new()
        }
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn touched_count(&self) -> usize {
        self.touched.len()
    }

    /// Clears the touched flag on every field.
    pub fn reset_touched(&mut self) {
        self.touched.clear();
    }

    /// True when every field passes its rules.
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.rules.check(self.values.get(&f.name)).is_empty())
    }

    /// Snapshot of the current values in declaration order.
    pub fn values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|f| self.values.get(&f.name).map(|v| (f.name.clone(), v.clone())))
            .collect()
    }
}

impl WizardForm for Form {
    fn is_field_valid(&self, name: &str) -> bool {
        if !self.has_field(name) {
            warn!("Validity requested for unknown field '{}'", name);
            return false;
        }
        self.errors(name).is_empty()
    }

    fn mark_touched(&mut self, name: &str) {
        if self.has_field(name) {
            self.touched.insert(name.to_string());
        }
    }

    fn field_label(&self, name: &str) -> String {
        self.field(name)
            .map(|f| f.label.clone())
            .unwrap_or_else(|| name.to_string())
    }
}
