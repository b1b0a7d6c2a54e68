//! Validation rule definitions.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{FormError, FormResult};

/// Compiled pattern of a `regex:` rule. Compares by source text.
#[derive(Debug, Clone)]
pub struct RulePattern(Regex);

impl RulePattern {
    pub fn new(source: &str) -> FormResult<Self> {
        Regex::new(source)
            .map(Self)
            .map_err(|_| FormError::InvalidRule(format!("regex:{source}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for RulePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for RulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single server-side validation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Value must be present and non-empty.
    Required,
    /// Empty values skip the remaining rules.
    Nullable,
    Email,
    Url,
    Numeric,
    Integer,
    /// Lower bound: numeric value, string length, or item count.
    Min(f64),
    /// Upper bound: numeric value, string length, or item count.
    Max(f64),
    /// Value must be one of the listed keys.
    In(Vec<String>),
    Array,
    /// An uploaded file must be present under the field name.
    File,
    /// Value must match the pattern.
    Regex(RulePattern),
    /// `<field>_confirmation` must hold the same value.
    Confirmed,
}

impl Rule {
    /// Build a `regex:` rule, compiling the pattern once.
    pub fn regex(source: &str) -> FormResult<Self> {
        RulePattern::new(source).map(Rule::Regex)
    }

    /// Whether the rule runs even when the value is empty.
    pub fn is_implicit(&self) -> bool {
        matches!(self, Rule::Required)
    }
}

pub(crate) fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        format!("{bound}")
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("required"),
            Rule::Nullable => f.write_str("nullable"),
            Rule::Email => f.write_str("email"),
            Rule::Url => f.write_str("url"),
            Rule::Numeric => f.write_str("numeric"),
            Rule::Integer => f.write_str("integer"),
            Rule::Min(n) => write!(f, "min:{}", format_bound(*n)),
            Rule::Max(n) => write!(f, "max:{}", format_bound(*n)),
            Rule::In(values) => write!(f, "in:{}", values.join(",")),
            Rule::Array => f.write_str("array"),
            Rule::File => f.write_str("file"),
            Rule::Regex(pattern) => write!(f, "regex:{pattern}"),
            Rule::Confirmed => f.write_str("confirmed"),
        }
    }
}

impl FromStr for Rule {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg)),
            None => (s.trim(), None),
        };

        let bound = |arg: Option<&str>| -> Result<f64, FormError> {
            arg.and_then(|a| a.trim().parse::<f64>().ok())
                .ok_or_else(|| FormError::InvalidRule(s.to_string()))
        };

        let rule = match name {
            "required" => Rule::Required,
            "nullable" => Rule::Nullable,
            "email" => Rule::Email,
            "url" => Rule::Url,
            "numeric" => Rule::Numeric,
            "integer" => Rule::Integer,
            "array" => Rule::Array,
            "file" => Rule::File,
            "confirmed" => Rule::Confirmed,
            "min" => Rule::Min(bound(arg)?),
            "max" => Rule::Max(bound(arg)?),
            "in" => {
                let arg = arg.ok_or_else(|| FormError::InvalidRule(s.to_string()))?;
                Rule::In(arg.split(',').map(|v| v.trim().to_string()).collect())
            }
            "regex" => {
                let pattern = arg.ok_or_else(|| FormError::InvalidRule(s.to_string()))?;
                Rule::regex(pattern).map_err(|_| FormError::InvalidRule(s.to_string()))?
            }
            _ => return Err(FormError::InvalidRule(s.to_string())),
        };

        Ok(rule)
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
