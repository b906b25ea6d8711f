//! Step Wizard Module
//!
//! Multi-step form navigation with per-step validation.
//!
//! # Structure
//!
//! - [`model`]: Declarative form definitions (fields, steps, cross-field rules)
//! - [`rules`]: Field rule compilation and cross-field evaluation
//! - [`form`]: Runtime form state (values, touched fields)
//! - [`engine`]: The generic wizard and its navigation rules
//! - [`parser`]: YAML loading and wizard construction

pub mod engine;
pub mod form;
pub mod model;
pub mod parser;
pub mod rules;

pub use engine::{FnCheck, Navigation, StepCheck, StepDefinition, StepIcon, Wizard, WizardForm};
pub use form::Form;
pub use model::{CrossFieldRule, FieldSpec, FormDefinition, StepSpec};
pub use parser::{build_wizard, check_definition, load_form_definition, parse_form_definition};
pub use rules::FieldError;
