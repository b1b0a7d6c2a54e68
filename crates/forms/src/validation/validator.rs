//! Request validation against per-field rules.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::request::FormRequest;
use super::rules::{Rule, format_bound};

/// Rules keyed by field name, in declaration order.
pub type RuleSet = IndexMap<String, Vec<Rule>>;

/// Validated input keyed by field name.
pub type ValidatedInput = IndexMap<String, Value>;

#[allow(clippy::expect_used)]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// Field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("The given data was invalid.")]
pub struct ValidationErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.errors.iter()
    }
}

/// Validates request input against a rule set.
pub trait RequestValidator: Send + Sync {
    fn validate(&self, request: &FormRequest, rules: &RuleSet)
    -> Result<ValidatedInput, ValidationErrors>;
}

/// Default validator implementing [`Rule`] semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }

    fn is_empty_value(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }

    fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Size used by min/max: numeric value, item count, or character count.
    fn size(value: &Value, rules: &[Rule]) -> Option<f64> {
        let numeric = rules
            .iter()
            .any(|r| matches!(r, Rule::Numeric | Rule::Integer));
        match value {
            Value::Array(items) => Some(items.len() as f64),
            _ if numeric => Self::as_number(value),
            _ => Self::as_text(value).map(|s| s.chars().count() as f64),
        }
    }

    fn unit(value: &Value, rules: &[Rule]) -> &'static str {
        let numeric = rules
            .iter()
            .any(|r| matches!(r, Rule::Numeric | Rule::Integer));
        match value {
            Value::Array(_) => " items",
            _ if numeric => "",
            _ => " characters",
        }
    }

    /// Check one rule. Returns the failure message, if any.
    fn check(
        &self,
        attribute: &str,
        field: &str,
        rule: &Rule,
        rules: &[Rule],
        request: &FormRequest,
    ) -> Option<String> {
        let value = request.input(field);

        match rule {
            Rule::Required => (Self::is_empty_value(value) && !request.has_file(field))
                .then(|| format!("The {attribute} field is required.")),
            Rule::Nullable => None,
            Rule::File => {
                (!request.has_file(field)).then(|| format!("The {attribute} must be a file."))
            }
            _ => {
                let value = value?;
                let ok = match rule {
                    Rule::Email => Self::as_text(value).is_some_and(|s| EMAIL_REGEX.is_match(&s)),
                    Rule::Url => Self::as_text(value).is_some_and(|s| {
                        url::Url::parse(&s)
                            .is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
                    }),
                    Rule::Numeric => Self::as_number(value).is_some(),
                    Rule::Integer => match value {
                        Value::Number(n) => n.is_i64() || n.is_u64(),
                        Value::String(s) => s.trim().parse::<i64>().is_ok(),
                        _ => false,
                    },
                    Rule::Min(bound) => Self::size(value, rules).is_some_and(|s| s >= *bound),
                    Rule::Max(bound) => Self::size(value, rules).is_some_and(|s| s <= *bound),
                    Rule::In(allowed) => match value {
                        Value::Array(items) => items.iter().all(|item| {
                            Self::as_text(item).is_some_and(|s| allowed.contains(&s))
                        }),
                        _ => Self::as_text(value).is_some_and(|s| allowed.contains(&s)),
                    },
                    Rule::Array => value.is_array(),
                    Rule::Regex(pattern) => {
                        Self::as_text(value).is_some_and(|s| pattern.is_match(&s))
                    }
                    Rule::Confirmed => {
                        request.input(&format!("{field}_confirmation")) == Some(value)
                    }
                    Rule::Required | Rule::Nullable | Rule::File => true,
                };

                if ok {
                    return None;
                }

                Some(match rule {
                    Rule::Email => format!("The {attribute} must be a valid email address."),
                    Rule::Numeric => format!("The {attribute} must be a number."),
                    Rule::Integer => format!("The {attribute} must be an integer."),
                    Rule::Min(bound) => format!(
                        "The {attribute} must be at least {}{}.",
                        format_bound(*bound),
                        Self::unit(value, rules)
                    ),
                    Rule::Max(bound) => format!(
                        "The {attribute} may not be greater than {}{}.",
                        format_bound(*bound),
                        Self::unit(value, rules)
                    ),
                    Rule::In(_) => format!("The selected {attribute} is invalid."),
                    Rule::Array => format!("The {attribute} must be an array."),
                    Rule::Confirmed => format!("The {attribute} confirmation does not match."),
                    _ => format!("The {attribute} format is invalid."),
                })
            }
        }
    }
}

impl RequestValidator for RuleValidator {
    fn validate(
        &self,
        request: &FormRequest,
        rules: &RuleSet,
    ) -> Result<ValidatedInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut validated = ValidatedInput::new();

        for (field, field_rules) in rules {
            let attribute = field.replace('_', " ");
            let empty = Self::is_empty_value(request.input(field)) && !request.has_file(field);

            for rule in field_rules {
                // Empty optional values only face implicit rules.
                if empty && !rule.is_implicit() {
                    continue;
                }
                if let Some(message) = self.check(&attribute, field, rule, field_rules, request) {
                    errors.add(field.as_str(), message);
                    // Stop at the first failure for this field.
                    break;
                }
            }

            if let Some(value) = request.input(field) {
                validated.insert(field.clone(), value.clone());
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            tracing::debug!(fields = errors.len(), "request failed validation");
            Err(errors)
        }
    }
}
