//! Declarative form validation.
//!
//! A form is described by a static table of fields and their rules. The
//! same table checks submissions before anything touches the store and
//! produces the field-scoped errors returned to the client.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// One constraint on a field value.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Present and not blank; carries the user-facing message.
    Required(&'static str),
    /// At most this many characters.
    MaxLen(usize),
    /// One of a closed set of values.
    OneOf(&'static [&'static str]),
    Email,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    Uuid,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

/// Field table for one form.
#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    pub form: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Read access to submitted field values by name.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Every field that failed, in schema order. At most one error per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl FormSchema {
    pub fn validate(&self, source: &dyn FieldSource) -> Result<(), ValidationErrors> {
        let errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|spec| check_field(spec, source.field(spec.name)))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(form = self.form, failed = errors.len(), "Form rejected");
            Err(ValidationErrors { errors })
        }
    }
}

fn check_field(spec: &FieldSpec, value: Option<&str>) -> Option<FieldError> {
    let value = value.map(str::trim).filter(|v| !v.is_empty());

    let Some(value) = value else {
        return spec.rules.iter().find_map(|rule| match rule {
            Rule::Required(message) => Some(FieldError::new(spec.name, *message)),
            _ => None,
        });
    };

    spec.rules
        .iter()
        .find_map(|rule| check_rule(rule, value).map(|message| FieldError::new(spec.name, message)))
}

fn check_rule(rule: &Rule, value: &str) -> Option<String> {
    match rule {
        Rule::Required(_) => None,
        Rule::MaxLen(max) => {
            (value.chars().count() > *max).then(|| format!("Must be {max} characters or fewer"))
        }
        Rule::OneOf(allowed) => {
            (!allowed.contains(&value)).then(|| format!("Must be one of: {}", allowed.join(", ")))
        }
        Rule::Email => (!EMAIL_PATTERN.is_match(value)).then(|| "Invalid email address".to_string()),
        Rule::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .is_err()
            .then(|| "Invalid date (expected YYYY-MM-DD)".to_string()),
        Rule::Uuid => uuid::Uuid::parse_str(value)
            .is_err()
            .then(|| "Invalid identifier".to_string()),
    }
}

/// Trimmed value, `None` when blank.
pub fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
