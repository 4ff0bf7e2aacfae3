//! Form validation results
//!
//! The stores never validate their input; forms run these checks before
//! calling them.

use std::fmt;
use thiserror::Error;

/// One rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field a form rejected, in form order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid field(s): {}", .0.len(), join(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// True when `field` was rejected
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected
    pub(crate) fn into_result(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_is_ok() {
        assert!(ValidationErrors::into_result(Vec::new()).is_ok());
    }

    #[test]
    fn test_display_lists_fields() {
        let err = ValidationErrors::into_result(vec![
            FieldError::new("name", "required"),
            FieldError::new("email", "required"),
        ])
        .unwrap_err();

        assert!(err.has("email"));
        assert!(!err.has("password"));
        assert_eq!(
            err.to_string(),
            "2 invalid field(s): name: required; email: required"
        );
    }
}
