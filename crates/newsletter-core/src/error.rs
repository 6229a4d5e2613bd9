//! Error taxonomy shared by the services and the stores.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::access::Capability;

/// Why a service operation did not go through.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} {id} does not exist")]
    NotFound { entity_type: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    #[error("already exists: {0}")]
    Duplicate(String),

    #[error("login required")]
    Unauthenticated,

    #[error("missing capability {0}")]
    Forbidden(Capability),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

/// Failures reported by a repository.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("store unreachable: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("no such row")]
    NotFound,

    #[error("constraint violated: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                fields.add(field.to_string(), message);
            }
        }
        fields
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.add("title", "This field is required.");
        errors.add("text", "Too long.");

        assert_eq!(
            errors.to_string(),
            "text: Too long.; title: This field is required."
        );
        assert_eq!(errors.get("title"), ["This field is required."]);
        assert!(errors.get("author").is_empty());
    }

    #[test]
    fn test_constraint_maps_to_duplicate() {
        let err: DomainError = RepoError::Constraint("username taken".into()).into();
        assert!(matches!(err, DomainError::Duplicate(_)));
    }
}
