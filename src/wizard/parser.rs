//! Form Definition Loading
//!
//! Reads form definitions from YAML and turns them into ready-to-use
//! wizards, checking that every step only references declared fields.

use std::collections::HashMap;
use std::fs;

use log::{debug, info, warn};

use super::engine::{StepDefinition, Wizard};
use super::form::Form;
use super::model::FormDefinition;
use crate::error::DefinitionError;
use crate::notify::Notifier;

/// Loads a form definition from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use remitdesk::wizard::load_form_definition;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let definition = load_form_definition("forms/agent.yaml")?;
///     println!("{} steps", definition.steps.len());
///     Ok(())
/// }
/// ```
pub fn load_form_definition(path: &str) -> Result<FormDefinition, DefinitionError> {
    info!("Loading form definition from: {}", path);

    let yaml_content = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_string(),
        source,
    })?;

    debug!("YAML content loaded ({} bytes)", yaml_content.len());
    parse_form_definition(&yaml_content)
}

/// Parses a form definition from YAML text.
pub fn parse_form_definition(yaml: &str) -> Result<FormDefinition, DefinitionError> {
    let definition: FormDefinition = serde_yaml::from_str(yaml)?;
    info!(
        "Parsed form '{}': {} fields, {} steps",
        definition.name,
        definition.fields.len(),
        definition.steps.len()
    );
    Ok(definition)
}

/// Serializes a form definition back to YAML.
pub fn to_yaml(definition: &FormDefinition) -> Result<String, DefinitionError> {
    Ok(serde_yaml::to_string(definition)?)
}

/// Checks that every step references declared fields only.
///
/// A field required by more than one step is allowed but logged.
pub fn check_definition(definition: &FormDefinition) -> Result<(), DefinitionError> {
    if definition.steps.is_empty() {
        return Err(DefinitionError::NoSteps);
    }

    let mut owners: HashMap<&str, usize> = HashMap::new();

    for (index, step) in definition.steps.iter().enumerate() {
        let referenced = step
            .required
            .iter()
            .map(String::as_str)
            .chain(step.checks.iter().flat_map(|c| c.referenced_fields()));

        for field in referenced {
            if definition.field(field).is_none() {
                return Err(DefinitionError::UnknownField {
                    step: index,
                    title: step.title.clone(),
                    field: field.to_string(),
                });
            }
        }

        for field in &step.required {
            if let Some(first) = owners.insert(field.as_str(), index) {
                if first != index {
                    warn!(
                        "Field '{}' is required by steps {} and {}",
                        field, first, index
                    );
                }
            }
        }
    }

    Ok(())
}

/// Builds a wizard over a fresh [`Form`] for the definition.
pub fn build_wizard<N: Notifier>(
    definition: &FormDefinition,
    notifier: N,
) -> Result<Wizard<Form, N>, DefinitionError> {
    check_definition(definition)?;

    let form = Form::from_specs(&definition.name, &definition.fields)?;

    let steps = definition
        .steps
        .iter()
        .map(|spec| {
            spec.checks.iter().cloned().fold(
                StepDefinition::new(&spec.title).require(spec.required.iter().cloned()),
                |step, rule| step.with_check(rule),
            )
        })
        .collect();

    Wizard::new(form, steps, notifier)
}
