//! Step Wizard Engine
//!
//! Gates forward navigation through an ordered list of form sections.
//! Each step names the fields that must be valid before the user may leave
//! it, and may carry extra checks spanning several fields. Going back is
//! always allowed.
//!
//! The engine is generic over the bound form ([`WizardForm`]) and the
//! notification channel ([`Notifier`]), so every multi-step form shares the
//! same navigation rules instead of carrying its own copy.
//!
//! # Example
//!
//! ```
//! use remitdesk::notify::RecordingNotifier;
//! use remitdesk::wizard::{FieldSpec, Form, Navigation, StepDefinition, Wizard};
//!
//! let form = Form::from_specs("branch", &[
//!     FieldSpec::new("branch_name").required(),
//!     FieldSpec::new("city").required(),
//! ]).unwrap();
//!
//! let steps = vec![
//!     StepDefinition::new("Branch").require(["branch_name"]),
//!     StepDefinition::new("Location").require(["city"]),
//! ];
//!
//! let mut wizard = Wizard::new(form, steps, RecordingNotifier::new()).unwrap();
//! assert!(matches!(wizard.advance(), Navigation::Blocked { step: 0 }));
//!
//! wizard.form_mut().set("branch_name", "Harbour Road");
//! assert_eq!(wizard.advance(), Navigation::Moved { from: 0, to: 1 });
//! ```

use std::fmt;

use log::{debug, info, warn};

use crate::error::DefinitionError;
use crate::notify::{Notification, Notifier};

/// The view of a form the wizard needs.
pub trait WizardForm {
    /// True when the named field currently passes its rules.
    fn is_field_valid(&self, name: &str) -> bool;

    /// Flags a field as touched so its messages become visible.
    fn mark_touched(&mut self, name: &str);

    /// Label used in warnings.
    fn field_label(&self, name: &str) -> String {
        name.to_string()
    }
}

/// An extra condition a step must satisfy before advancing.
pub trait StepCheck<F> {
    /// Returns a user-facing reason on failure.
    fn check(&self, form: &F) -> Result<(), String>;

    /// Fields to mark touched when the step is submitted.
    fn surfaced_fields(&self, _form: &F) -> Vec<String> {
        Vec::new()
    }
}

/// Adapts a closure into a [`StepCheck`].
pub struct FnCheck<C>(pub C);

impl<F, C> StepCheck<F> for FnCheck<C>
where
    C: Fn(&F) -> Result<(), String>,
{
    fn check(&self, form: &F) -> Result<(), String> {
        (self.0)(form)
    }
}

/// One section of a wizard.
pub struct StepDefinition<F> {
    index: usize,
    title: String,
    required_fields: Vec<String>,
    checks: Vec<Box<dyn StepCheck<F>>>,
}

impl<F> StepDefinition<F> {
    /// Creates a step with no requirements. Its index is assigned by
    /// [`Wizard::new`] from its position.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            index: 0,
            title: title.into(),
            required_fields: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Adds required field names.
    pub fn require<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Attaches a check evaluated on every advance from this step.
    pub fn with_check(mut self, check: impl StepCheck<F> + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Attaches a boolean predicate with the message shown when it fails.
    pub fn with_predicate<P>(self, message: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&F) -> bool + 'static,
        F: 'static,
    {
        let message = message.into();
        self.with_check(FnCheck(move |form: &F| {
            if predicate(form) {
                Ok(())
            } else {
                Err(message.clone())
            }
        }))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }
}

impl<F> fmt::Debug for StepDefinition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("index", &self.index)
            .field("title", &self.title)
            .field("required_fields", &self.required_fields)
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The current step changed
    Moved { from: usize, to: usize },
    /// Validation of `step` failed and a warning was shown
    Blocked { step: usize },
    /// Nothing to do (already at the boundary, or target out of range)
    Unchanged,
}

/// Indicator shown next to a step label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepIcon {
    Valid,
    Invalid,
    Neutral,
}

/// Multi-step navigation over a bound form.
pub struct Wizard<F, N> {
    form: F,
    steps: Vec<StepDefinition<F>>,
    current: usize,
    notifier: N,
}

impl<F: WizardForm, N: Notifier> Wizard<F, N> {
    /// Creates a wizard positioned on the first step.
    pub fn new(form: F, mut steps: Vec<StepDefinition<F>>, notifier: N) -> Result<Self, DefinitionError> {
        if steps.is_empty() {
            return Err(DefinitionError::NoSteps);
        }

        for (index, step) in steps.iter_mut().enumerate() {
            step.index = index;
        }

        debug!("Wizard created with {} steps", steps.len());

        Ok(Self {
            form,
            steps,
            current: 0,
            notifier,
        })
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[StepDefinition<F>] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepDefinition<F>> {
        self.steps.get(index)
    }

    pub fn is_first_step(&self) -> bool {
        self.current == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Consumes the wizard, returning the form and notifier.
    pub fn into_parts(self) -> (F, N) {
        (self.form, self.notifier)
    }

    /// Read-only validity of a step's required fields.
    ///
    /// Step checks are not evaluated and no field is touched. An index past
    /// the last step is never valid.
    pub fn is_step_valid(&self, index: usize) -> bool {
        match self.steps.get(index) {
            Some(step) => step
                .required_fields
                .iter()
                .all(|name| self.form.is_field_valid(name)),
            None => false,
        }
    }

    /// Icon for a step label. Does not affect navigation.
    pub fn step_icon(&self, index: usize) -> StepIcon {
        if self.is_step_valid(index) {
            StepIcon::Valid
        } else if index < self.current {
            StepIcon::Invalid
        } else {
            StepIcon::Neutral
        }
    }

    /// Icons for every step in order.
    pub fn step_icons(&self) -> Vec<StepIcon> {
        (0..self.steps.len()).map(|i| self.step_icon(i)).collect()
    }

    /// Moves to the next step if the current one validates.
    pub fn advance(&mut self) -> Navigation {
        if self.is_last_step() {
            return Navigation::Unchanged;
        }

        if !self.submit_current() {
            return Navigation::Blocked { step: self.current };
        }

        let from = self.current;
        self.current += 1;
        info!("Wizard advanced: step {} -> {}", from, self.current);
        Navigation::Moved {
            from,
            to: self.current,
        }
    }

    /// Moves to the previous step without validation.
    pub fn retreat(&mut self) -> Navigation {
        if self.current == 0 {
            return Navigation::Unchanged;
        }

        let from = self.current;
        self.current -= 1;
        debug!("Wizard retreated: step {} -> {}", from, self.current);
        Navigation::Moved {
            from,
            to: self.current,
        }
    }

    /// Jumps to any step.
    ///
    /// Backward jumps always succeed. Forward jumps (including to the current
    /// step) validate only the current step, not the steps in between.
    pub fn jump_to(&mut self, target: usize) -> Navigation {
        if target >= self.steps.len() {
            warn!(
                "Ignoring jump to step {} (wizard has {} steps)",
                target,
                self.steps.len()
            );
            return Navigation::Unchanged;
        }

        if target < self.current {
            let from = self.current;
            self.current = target;
            debug!("Wizard jumped back: step {} -> {}", from, target);
            return Navigation::Moved { from, to: target };
        }

        if !self.submit_current() {
            return Navigation::Blocked { step: self.current };
        }

        if target == self.current {
            return Navigation::Unchanged;
        }

        let from = self.current;
        self.current = target;
        info!("Wizard jumped: step {} -> {}", from, target);
        Navigation::Moved { from, to: target }
    }

    /// Touches and validates the current step. On failure shows exactly one
    /// warning and returns false.
    fn submit_current(&mut self) -> bool {
        let step = &self.steps[self.current];
        let form = &mut self.form;
        let mut problems = Vec::new();

        for name in &step.required_fields {
            form.mark_touched(name);
        }
        for check in &step.checks {
            for name in check.surfaced_fields(form) {
                form.mark_touched(&name);
            }
        }

        let invalid: Vec<String> = step
            .required_fields
            .iter()
            .filter(|name| !form.is_field_valid(name))
            .map(|name| form.field_label(name))
            .collect();

        if !invalid.is_empty() {
            problems.push(format!("Please complete: {}", invalid.join(", ")));
        }

        for check in &step.checks {
            if let Err(reason) = check.check(form) {
                problems.push(reason);
            }
        }

        if problems.is_empty() {
            return true;
        }

        warn!(
            "Step {} ('{}') blocked: {}",
            step.index,
            step.title,
            problems.join("; ")
        );

        let notification = Notification::warning(
            format!("{} is incomplete", step.title),
            problems.join("\n"),
        );
        self.notifier.alert(&notification);
        false
    }
}

impl<F, N> fmt::Debug for Wizard<F, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("current", &self.current)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}
