//! Field-level validation errors
//!
//! Forms are validated with the `validator` derive; its output is flattened
//! into [`FieldErrors`], a map from field path to messages that is returned
//! to the client verbatim. Nested forms (the choices of a question) use
//! prefixed paths such as `choices[1].choice_text`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

/// Maximum username length, shared by registration and profile update
pub const USERNAME_MAX_LENGTH: usize = 150;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Merge `validator` output, prefixing every field with `prefix.`
    pub fn extend_from(&mut self, prefix: Option<&str>, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            let path = match prefix {
                Some(prefix) => format!("{}.{}", prefix, field),
                None => field.to_string(),
            };
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.add(&path, &message);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whether any collected field path starts with `prefix`
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.0.keys().any(|field| field.starts_with(prefix))
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> crate::utils::errors::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::utils::errors::PollError::Validation(self))
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.extend_from(None, &errors);
        field_errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Letters, digits and `@ . + - _` only
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = !username.is_empty()
        && username.chars().count() <= USERNAME_MAX_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("username");
        error.message = Some(
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        );
        Err(error)
    }
}

/// Rejects values made only of whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("This field may not be blank.".into());
        Err(error)
    } else {
        Ok(())
    }
}
