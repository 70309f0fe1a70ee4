//! Field-level validation.
//!
//! Checks run in a fixed order and stop at the first failure: required-ness,
//! then minimum and maximum length, then the regex pattern. An optional field
//! left empty therefore never reports a length or format problem.

mod step;

use regex::Regex;
use thiserror::Error;

use crate::domain::{Field, FieldValue};

pub use step::{StepReport, validate_step};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("This field is required")]
    Required,
    #[error("Minimum length is {min}")]
    TooShort { min: usize },
    #[error("Maximum length is {max}")]
    TooLong { max: usize },
    #[error("Invalid format")]
    InvalidFormat,
    #[error("Invalid regex pattern")]
    InvalidPattern { pattern: String, reason: String },
}

/// Validate `value` as a candidate answer for `field`.
pub fn validate(field: &Field, value: Option<&FieldValue>) -> Result<(), ValidationError> {
    check_required(field, value)?;
    check_format(field, value)
}

/// Validate the value currently stored on the field.
pub fn validate_field(field: &Field) -> Result<(), ValidationError> {
    validate(field, field.value().as_ref())
}

fn check_required(field: &Field, value: Option<&FieldValue>) -> Result<(), ValidationError> {
    if field.required && value.is_none_or(FieldValue::is_blank) {
        return Err(ValidationError::Required);
    }
    Ok(())
}

/// Length and pattern checks; these only look at non-empty string answers.
fn check_format(field: &Field, value: Option<&FieldValue>) -> Result<(), ValidationError> {
    let Some(text) = value.and_then(FieldValue::as_str) else {
        return Ok(());
    };
    if text.is_empty() {
        return Ok(());
    }
    let length = text.chars().count();
    if let Some(min) = field.min_length().filter(|min| *min > 0)
        && length < min
    {
        return Err(ValidationError::TooShort { min });
    }
    if let Some(max) = field.max_length().filter(|max| *max > 0)
        && length > max
    {
        return Err(ValidationError::TooLong { max });
    }
    if let Some(pattern) = field.pattern() {
        let regex = Regex::new(pattern).map_err(|err| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;
        if !regex.is_match(text) {
            return Err(ValidationError::InvalidFormat);
        }
    }
    Ok(())
}
