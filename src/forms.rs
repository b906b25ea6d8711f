//! Built-in Forms
//!
//! Step tables for the agent and agent-branch onboarding forms. Both run on
//! the shared wizard engine; only their field sets and steps differ.

use crate::error::DefinitionError;
use crate::notify::Notifier;
use crate::wizard::{build_wizard, CrossFieldRule, FieldSpec, Form, FormDefinition, StepSpec, Wizard};

const TIME_PATTERN: &str = "([01][0-9]|2[0-3]):[0-5][0-9]";
const CODE_PATTERN: &str = "[A-Z0-9]{3,10}";
const EMAIL_PATTERN: &str = r"[^@\s]+@[^@\s]+\.[^@\s]+";
const PHONE_PATTERN: &str = r"\+?[0-9]{7,15}";
const CURRENCY_PATTERN: &str = "[A-Z]{3}";
const URL_PATTERN: &str = r"https?://\S+";

fn time_field(name: &str, label: &str) -> FieldSpec {
    FieldSpec::new(name)
        .required()
        .with_label(label)
        .with_pattern(TIME_PATTERN)
}

fn opening_hours() -> CrossFieldRule {
    CrossFieldRule::RangeOrder {
        start: "opening_time".to_string(),
        end: "closing_time".to_string(),
    }
}

/// The agent onboarding form.
pub fn agent_form() -> FormDefinition {
    FormDefinition::new("agent")
        // Basic information
        .with_field(FieldSpec::new("agent_name").required().with_label("Agent name").with_max_length(100))
        .with_field(FieldSpec::new("agent_code").required().with_label("Agent code").with_pattern(CODE_PATTERN))
        .with_field(FieldSpec::new("country").required().with_label("Country"))
        .with_field(FieldSpec::new("province").required().with_label("Province"))
        .with_field(FieldSpec::new("city").required().with_label("City"))
        // Contact
        .with_field(FieldSpec::new("contact_person").required().with_label("Contact person"))
        .with_field(FieldSpec::new("email").required().with_label("Email").with_pattern(EMAIL_PATTERN))
        .with_field(FieldSpec::new("phone").required().with_label("Phone").with_pattern(PHONE_PATTERN))
        .with_field(FieldSpec::new("address").with_label("Address").with_max_length(250))
        // Operating hours
        .with_field(time_field("opening_time", "Opening time"))
        .with_field(time_field("closing_time", "Closing time"))
        // API access
        .with_field(FieldSpec::new("api_enabled").with_label("API access"))
        .with_field(FieldSpec::new("api_username").with_label("API username").with_min_length(4))
        .with_field(FieldSpec::new("callback_url").with_label("Callback URL").with_pattern(URL_PATTERN))
        // Settlement
        .with_field(
            FieldSpec::new("settlement_currency")
                .required()
                .with_label("Settlement currency")
                .with_pattern(CURRENCY_PATTERN),
        )
        .with_field(FieldSpec::new("bank_account").required().with_label("Bank account"))
        .with_field(
            FieldSpec::new("daily_limit")
                .required()
                .with_label("Daily limit")
                .with_range(Some(0.0), None),
        )
        .with_step(StepSpec::new("Basic information").require([
            "agent_name",
            "agent_code",
            "country",
            "province",
            "city",
        ]))
        .with_step(StepSpec::new("Contact").require(["contact_person", "email", "phone", "address"]))
        .with_step(
            StepSpec::new("Operating hours")
                .require(["opening_time", "closing_time"])
                .with_check(opening_hours()),
        )
        .with_step(StepSpec::new("API access").with_check(CrossFieldRule::RequiredWhen {
            toggle: "api_enabled".to_string(),
            fields: vec!["api_username".to_string(), "callback_url".to_string()],
        }))
        .with_step(StepSpec::new("Settlement").require([
            "settlement_currency",
            "bank_account",
            "daily_limit",
        ]))
}

/// The agent-branch form.
pub fn agent_branch_form() -> FormDefinition {
    FormDefinition::new("agent-branch")
        .with_field(FieldSpec::new("agent_id").required().with_label("Agent"))
        .with_field(FieldSpec::new("branch_name").required().with_label("Branch name").with_max_length(100))
        .with_field(FieldSpec::new("branch_code").required().with_label("Branch code").with_pattern(CODE_PATTERN))
        .with_field(FieldSpec::new("country").required().with_label("Country"))
        .with_field(FieldSpec::new("province").required().with_label("Province"))
        .with_field(FieldSpec::new("city").required().with_label("City"))
        .with_field(FieldSpec::new("address").required().with_label("Address").with_max_length(250))
        .with_field(time_field("opening_time", "Opening time"))
        .with_field(time_field("closing_time", "Closing time"))
        .with_step(StepSpec::new("Branch").require(["agent_id", "branch_name", "branch_code"]))
        .with_step(StepSpec::new("Location").require(["country", "province", "city", "address"]))
        .with_step(
            StepSpec::new("Schedule")
                .require(["opening_time", "closing_time"])
                .with_check(opening_hours()),
        )
        .with_step(StepSpec::new("Review"))
}

/// Looks up a built-in form by name.
pub fn builtin_form(name: &str) -> Option<FormDefinition> {
    match name {
        "agent" => Some(agent_form()),
        "agent-branch" | "agent_branch" | "branch" => Some(agent_branch_form()),
        _ => None,
    }
}

/// Builds a wizard for a built-in form.
pub fn builtin_wizard<N: Notifier>(name: &str, notifier: N) -> Option<Result<Wizard<Form, N>, DefinitionError>> {
    builtin_form(name).map(|definition| build_wizard(&definition, notifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::wizard::{check_definition, Navigation, StepIcon};

    fn fill_agent_basics(wizard: &mut Wizard<Form, RecordingNotifier>) {
        let form = wizard.form_mut();
        form.set("agent_name", "Acme Remit");
        form.set("agent_code", "ACME01");
        form.set("country", "NP");
        form.set("province", "Bagmati");
        form.set("city", "Kathmandu");
    }

    fn fill_agent_contact(wizard: &mut Wizard<Form, RecordingNotifier>) {
        let form = wizard.form_mut();
        form.set("contact_person", "R. Sharma");
        form.set("email", "ops@acme.example");
        form.set("phone", "+9771234567");
    }

    #[test]
    fn test_builtin_definitions_are_consistent() {
        assert!(check_definition(&agent_form()).is_ok());
        assert!(check_definition(&agent_branch_form()).is_ok());
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin_form("agent").unwrap().name, "agent");
        assert_eq!(builtin_form("branch").unwrap().name, "agent-branch");
        assert!(builtin_form("bank").is_none());
        assert!(builtin_wizard("bank", RecordingNotifier::new()).is_none());
    }

    #[test]
    fn test_agent_walkthrough() {
        let mut wizard = builtin_wizard("agent", RecordingNotifier::new()).unwrap().unwrap();
        assert_eq!(wizard.step_count(), 5);

        assert_eq!(wizard.advance(), Navigation::Blocked { step: 0 });
        fill_agent_basics(&mut wizard);
        assert_eq!(wizard.advance(), Navigation::Moved { from: 0, to: 1 });

        fill_agent_contact(&mut wizard);
        assert_eq!(wizard.advance(), Navigation::Moved { from: 1, to: 2 });

        wizard.form_mut().set("opening_time", "08:00");
        wizard.form_mut().set("closing_time", "18:30");
        assert_eq!(wizard.advance(), Navigation::Moved { from: 2, to: 3 });

        // API access is off, so the step has nothing to check.
        assert_eq!(wizard.advance(), Navigation::Moved { from: 3, to: 4 });
        assert!(wizard.is_last_step());
        assert_eq!(wizard.notifier().count(), 1);
    }

    #[test]
    fn test_agent_api_toggle_requires_dependents() {
        let mut wizard = builtin_wizard("agent", RecordingNotifier::new()).unwrap().unwrap();
        fill_agent_basics(&mut wizard);
        fill_agent_contact(&mut wizard);
        wizard.form_mut().set("opening_time", "08:00");
        wizard.form_mut().set("closing_time", "18:30");
        assert_eq!(wizard.jump_to(1), Navigation::Moved { from: 0, to: 1 });
        assert_eq!(wizard.jump_to(3), Navigation::Moved { from: 1, to: 3 });

        wizard.form_mut().set("api_enabled", true);
        assert_eq!(wizard.advance(), Navigation::Blocked { step: 3 });
        assert!(wizard.form().is_touched("api_username"));
        assert!(wizard.notifier().last().unwrap().body.contains("Callback URL"));

        wizard.form_mut().set("api_username", "acme-api");
        wizard.form_mut().set("callback_url", "https://acme.example/hook");
        assert_eq!(wizard.advance(), Navigation::Moved { from: 3, to: 4 });
    }

    #[test]
    fn test_agent_invalid_email_blocks_contact() {
        let mut wizard = builtin_wizard("agent", RecordingNotifier::new()).unwrap().unwrap();
        fill_agent_basics(&mut wizard);
        wizard.advance();
        fill_agent_contact(&mut wizard);
        wizard.form_mut().set("email", "ops-at-acme");

        assert_eq!(wizard.advance(), Navigation::Blocked { step: 1 });
        assert!(wizard.notifier().last().unwrap().body.contains("Email"));
    }

    #[test]
    fn test_branch_review_step_is_trivially_valid() {
        let wizard = builtin_wizard("agent-branch", RecordingNotifier::new()).unwrap().unwrap();
        assert_eq!(wizard.step_icon(3), StepIcon::Valid);
        assert_eq!(wizard.step_icon(0), StepIcon::Neutral);
    }
}
