use regex::Regex;

use super::controller::{FormController, FormResult};
use super::validation::{FieldLens, ValidationError};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleKind {
    Required,
    MaxLength,
    Pattern,
}

/// A failed rule together with the message shown next to the field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    pub rule: RuleKind,
    pub message: String,
}

impl FieldError {
    pub fn new(rule: RuleKind, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl ValidationError for FieldError {
    fn message(&self) -> String {
        self.message.clone()
    }
}

#[derive(Clone, Debug)]
enum Rule {
    Required { message: String },
    MaxLength { max: usize, message: String },
    Pattern { regex: Regex, message: String },
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), FieldError> {
        match self {
            Rule::Required { message } => {
                if value.is_empty() {
                    return Err(FieldError::new(RuleKind::Required, message.clone()));
                }
            }
            // Empty values are left to `Required`.
            Rule::MaxLength { max, message } => {
                if !value.is_empty() && value.encode_utf16().count() > *max {
                    return Err(FieldError::new(RuleKind::MaxLength, message.clone()));
                }
            }
            Rule::Pattern { regex, message } => {
                if !value.is_empty() && !regex.is_match(value) {
                    return Err(FieldError::new(RuleKind::Pattern, message.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Declarative rule list for a single text field, checked in insertion order.
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Required {
            message: message.into(),
        });
        self
    }

    /// Length is measured in UTF-16 code units, so a character outside the
    /// Basic Multilingual Plane counts twice.
    pub fn max_len(mut self, max: usize, message: impl Into<String>) -> Self {
        self.rules.push(Rule::MaxLength {
            max,
            message: message.into(),
        });
        self
    }

    pub fn pattern(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Pattern {
            regex,
            message: message.into(),
        });
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule, Rule::Required { .. }))
    }
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError + From<FieldError>,
{
    /// Registers every rule as its own validator so first-error mode stops
    /// at the first failing rule.
    pub fn register_rules<L>(&self, lens: L, rules: FieldRules) -> FormResult<()>
    where
        L: FieldLens<T>,
        L::Value: AsRef<str>,
    {
        if rules.is_required() {
            self.register_required_field(lens)?;
        }
        for rule in rules.rules {
            self.register_field_validator(lens, move |_model: &T, value: &L::Value| {
                rule.check(value.as_ref()).map_err(E::from)
            })?;
        }
        Ok(())
    }
}
