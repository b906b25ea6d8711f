//! Field and Cross-Field Rules
//!
//! Per-field rules (required, length, pattern, numeric bounds) compiled from
//! a [`FieldSpec`], and the evaluation of [`CrossFieldRule`]s against a
//! bound [`Form`].
//!
//! Empty values only fail the `required` rule; every other rule is skipped
//! for an empty value so optional fields stay valid until filled in.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;

use super::engine::{StepCheck, WizardForm};
use super::form::Form;
use super::model::{CrossFieldRule, FieldSpec};
use crate::error::DefinitionError;

/// A single rule violation for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    PatternMismatch,
    NotANumber,
    BelowMin { min: f64 },
    AboveMax { max: f64 },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::TooShort { min } => write!(f, "must be at least {} characters", min),
            Self::TooLong { max } => write!(f, "must be at most {} characters", max),
            Self::PatternMismatch => write!(f, "has an invalid format"),
            Self::NotANumber => write!(f, "must be a number"),
            Self::BelowMin { min } => write!(f, "must be at least {}", min),
            Self::AboveMax { max } => write!(f, "must be at most {}", max),
        }
    }
}

/// Compiled rules for one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    min: Option<f64>,
    max: Option<f64>,
}

impl FieldRules {
    /// Compiles a field spec. Patterns are anchored to match the whole value.
    pub fn compile(spec: &FieldSpec) -> Result<Self, DefinitionError> {
        let pattern = spec
            .pattern
            .as_deref()
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p)).map_err(|source| {
                    DefinitionError::InvalidPattern {
                        field: spec.name.clone(),
                        source,
                    }
                })
            })
            .transpose()?;

        Ok(Self {
            required: spec.required,
            min_length: spec.min_length,
            max_length: spec.max_length,
            pattern,
            min: spec.min,
            max: spec.max,
        })
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns every rule the value violates.
    pub fn check(&self, value: Option<&Value>) -> Vec<FieldError> {
        let Some(value) = value.filter(|v| !is_blank(v)) else {
            return if self.required {
                vec![FieldError::Required]
            } else {
                Vec::new()
            };
        };

        let mut errors = Vec::new();
        let text = value_text(value).unwrap_or_default();
        let length = text.chars().count();

        if let Some(min) = self.min_length {
            if length < min {
                errors.push(FieldError::TooShort { min });
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                errors.push(FieldError::TooLong { max });
            }
        }

        if let Some(ref pattern) = self.pattern {
            if !pattern.is_match(&text) {
                errors.push(FieldError::PatternMismatch);
            }
        }

        if self.min.is_some() || self.max.is_some() {
            match as_number(value) {
                None => errors.push(FieldError::NotANumber),
                Some(n) => {
                    if let Some(min) = self.min.filter(|min| n < *min) {
                        errors.push(FieldError::BelowMin { min });
                    }
                    if let Some(max) = self.max.filter(|max| n > *max) {
                        errors.push(FieldError::AboveMax { max });
                    }
                }
            }
        }

        errors
    }
}

/// Returns true for null, blank strings and empty collections.
///
/// `false` is a value, not a blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Interprets a value as an on/off toggle.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        _ => false,
    }
}

/// Renders a scalar value as text. Strings are trimmed.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Finite numeric reading of a value. `NaN` and infinities are not numbers.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn is_non_finite(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(|n| !n.is_finite()),
        _ => false,
    }
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Orders two field values.
///
/// Both sides are compared as numbers if they both parse as numbers, then as
/// `HH:MM[:SS]` times, then as `YYYY-MM-DD` dates, and finally as text.
/// Returns `None` when either side is blank or reads as `NaN` or infinity.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if is_blank(a) || is_blank(b) || is_non_finite(a) || is_non_finite(b) {
        return None;
    }

    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }

    let (left, right) = (value_text(a)?, value_text(b)?);

    if let (Some(x), Some(y)) = (parse_time(&left), parse_time(&right)) {
        return Some(x.cmp(&y));
    }

    if let (Some(x), Some(y)) = (parse_date(&left), parse_date(&right)) {
        return Some(x.cmp(&y));
    }

    Some(left.cmp(&right))
}

impl StepCheck<Form> for CrossFieldRule {
    fn check(&self, form: &Form) -> Result<(), String> {
        match self {
            Self::RangeOrder { start, end } => {
                let (Some(a), Some(b)) = (form.get(start), form.get(end)) else {
                    return Ok(());
                };
                if is_blank(a) || is_blank(b) {
                    return Ok(());
                }

                match compare_values(a, b) {
                    Some(Ordering::Less) => Ok(()),
                    _ => Err(format!(
                        "{} must be earlier than {}",
                        form.field_label(start),
                        form.field_label(end)
                    )),
                }
            }
            Self::RequiredWhen { toggle, fields } => {
                if !form.get(toggle).is_some_and(is_truthy) {
                    return Ok(());
                }

                let missing: Vec<String> = fields
                    .iter()
                    .filter(|f| form.get(f).map_or(true, is_blank) || !form.is_field_valid(f))
                    .map(|f| form.field_label(f))
                    .collect();

                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(format!(
                        "{} is on, so these are required: {}",
                        form.field_label(toggle),
                        missing.join(", ")
                    ))
                }
            }
        }
    }

    fn surfaced_fields(&self, form: &Form) -> Vec<String> {
        match self {
            Self::RangeOrder { start, end } => vec![start.clone(), end.clone()],
            Self::RequiredWhen { toggle, fields } => {
                if form.get(toggle).is_some_and(is_truthy) {
                    fields.clone()
                } else {
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(spec: FieldSpec) -> FieldRules {
        FieldRules::compile(&spec).unwrap()
    }

    #[test]
    fn test_required_rule() {
        let r = rules(FieldSpec::new("name").required());
        assert_eq!(r.check(None), vec![FieldError::Required]);
        assert_eq!(r.check(Some(&json!("   "))), vec![FieldError::Required]);
        assert!(r.check(Some(&json!("Acme"))).is_empty());
    }

    #[test]
    fn test_optional_blank_skips_other_rules() {
        let r = rules(FieldSpec::new("code").with_min_length(3).with_pattern("[A-Z]+"));
        assert!(r.check(None).is_empty());
        assert!(r.check(Some(&json!(""))).is_empty());
    }

    #[test]
    fn test_length_rules_count_characters() {
        let r = rules(FieldSpec::new("city").with_min_length(3).with_max_length(5));
        assert_eq!(r.check(Some(&json!("ab"))), vec![FieldError::TooShort { min: 3 }]);
        assert_eq!(r.check(Some(&json!("abcdef"))), vec![FieldError::TooLong { max: 5 }]);
        assert!(r.check(Some(&json!("Iaşi"))).is_empty());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let r = rules(FieldSpec::new("currency").with_pattern("[A-Z]{3}"));
        assert!(r.check(Some(&json!("USD"))).is_empty());
        assert_eq!(r.check(Some(&json!("USDT"))), vec![FieldError::PatternMismatch]);
        assert_eq!(r.check(Some(&json!("xUSD"))), vec![FieldError::PatternMismatch]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = FieldRules::compile(&FieldSpec::new("bad").with_pattern("(unclosed"));
        assert!(matches!(result, Err(DefinitionError::InvalidPattern { .. })));
    }

    #[test]
    fn test_numeric_bounds() {
        let r = rules(FieldSpec::new("limit").with_range(Some(0.0), Some(1000.0)));
        assert!(r.check(Some(&json!(250))).is_empty());
        assert!(r.check(Some(&json!("999.5"))).is_empty());
        assert_eq!(r.check(Some(&json!(-1))), vec![FieldError::BelowMin { min: 0.0 }]);
        assert_eq!(r.check(Some(&json!(1001))), vec![FieldError::AboveMax { max: 1000.0 }]);
        assert_eq!(r.check(Some(&json!("lots"))), vec![FieldError::NotANumber]);
    }

    #[test]
    fn test_numeric_bounds_reject_non_finite() {
        let r = rules(FieldSpec::new("daily_limit").required().with_range(Some(0.0), Some(1000.0)));
        for text in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert_eq!(r.check(Some(&json!(text))), vec![FieldError::NotANumber], "{}", text);
        }

        let open = rules(FieldSpec::new("daily_limit").with_range(Some(0.0), None));
        assert_eq!(open.check(Some(&json!("inf"))), vec![FieldError::NotANumber]);
    }

    #[test]
    fn test_compare_non_finite_is_unordered() {
        assert_eq!(compare_values(&json!("NaN"), &json!("5")), None);
        assert_eq!(compare_values(&json!("1"), &json!("-inf")), None);
    }

    #[test]
    fn test_range_order_fails_on_non_finite_side() {
        let mut form = Form::from_specs("limits", &[FieldSpec::new("low"), FieldSpec::new("high")]).unwrap();
        let rule = CrossFieldRule::RangeOrder {
            start: "low".to_string(),
            end: "high".to_string(),
        };

        form.set("low", "1");
        form.set("high", "5");
        assert!(rule.check(&form).is_ok());

        form.set("high", "NaN");
        assert!(rule.check(&form).is_err());

        form.set("low", "NaN");
        form.set("high", "5");
        assert!(rule.check(&form).is_err());

        form.set("high", "");
        assert!(rule.check(&form).is_ok());
    }

    #[test]
    fn test_false_is_not_blank() {
        assert!(!is_blank(&json!(false)));
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!([])));
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!("off")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn test_compare_times() {
        assert_eq!(compare_values(&json!("09:00"), &json!("17:30")), Some(Ordering::Less));
        assert_eq!(compare_values(&json!("18:00"), &json!("09:00:00")), Some(Ordering::Greater));
        assert_eq!(compare_values(&json!("09:00"), &json!("09:00")), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_numbers_not_lexical() {
        assert_eq!(compare_values(&json!("9"), &json!("10")), Some(Ordering::Less));
        assert_eq!(compare_values(&json!(100), &json!("20")), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_dates() {
        assert_eq!(
            compare_values(&json!("2024-01-31"), &json!("2024-02-01")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_compare_blank_is_unordered() {
        assert_eq!(compare_values(&json!(""), &json!("10:00")), None);
        assert_eq!(compare_values(&json!("10:00"), &json!(null)), None);
    }

    #[test]
    fn test_field_error_display() {
        assert_eq!(FieldError::Required.to_string(), "is required");
        assert!(FieldError::TooLong { max: 4 }.to_string().contains('4'));
    }
}
