//! Schema management errors.

use crate::catalog::ValidationErrors;
use crate::error::Error;
use serde::Serialize;
use thiserror::Error;

/// The class of schema entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Field,
    FieldLayout,
    EntryType,
    Section,
    CategoryGroup,
    Category,
    Site,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Field => "field",
            EntityKind::FieldLayout => "field layout",
            EntityKind::EntryType => "entry type",
            EntityKind::Section => "section",
            EntityKind::CategoryGroup => "category group",
            EntityKind::Category => "category",
            EntityKind::Site => "site",
        };
        f.write_str(name)
    }
}

/// Errors raised by the schema managers.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Handle already used within its entity class.
    #[error("{kind} handle `{handle}` is already in use")]
    DuplicateHandle { kind: EntityKind, handle: String },

    /// Per-attribute validation messages.
    #[error("could not save {kind} `{label}`: {errors}")]
    Validation {
        kind: EntityKind,
        label: String,
        errors: ValidationErrors,
    },

    /// A referenced handle or identifier does not resolve.
    #[error("{kind} `{key}` not found")]
    NotFound { kind: EntityKind, key: String },

    /// No tab with the given name exists in the layout.
    #[error("tab `{tab}` not found in layout")]
    TabNotFound { tab: String },

    /// The field is still placed on layouts.
    #[error("field `{handle}` is used by {}", .layouts.join(", "))]
    FieldInUse { handle: String, layouts: Vec<String> },

    /// Strict layout build found handles that do not resolve.
    #[error("unresolved fields: {}", .handles.join(", "))]
    UnresolvedFields { handles: Vec<String> },

    /// Store failure.
    #[error(transparent)]
    Store(#[from] Error),
}

impl SchemaError {
    pub(crate) fn not_found(kind: EntityKind, key: impl ToString) -> Self {
        SchemaError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: EntityKind, handle: impl Into<String>) -> Self {
        SchemaError::DuplicateHandle {
            kind,
            handle: handle.into(),
        }
    }

    pub(crate) fn validation(kind: EntityKind, label: impl Into<String>, errors: ValidationErrors) -> Self {
        SchemaError::Validation {
            kind,
            label: label.into(),
            errors,
        }
    }

    /// Check if this is a duplicate handle error.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SchemaError::DuplicateHandle { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SchemaError::NotFound { .. })
    }

    /// Validation messages, if this is a validation error.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            SchemaError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SchemaError::duplicate(EntityKind::Field, "summary");
        assert_eq!(err.to_string(), "field handle `summary` is already in use");
        assert!(err.is_duplicate());

        let mut errors = ValidationErrors::new();
        errors.add("template", "Template cannot be blank.");
        let err = SchemaError::validation(EntityKind::Section, "thoughts", errors);
        assert_eq!(
            err.to_string(),
            r#"could not save section `thoughts`: {"template":["Template cannot be blank."]}"#
        );

        let err = SchemaError::FieldInUse {
            handle: "summary".into(),
            layouts: vec!["thought".into(), "travel".into()],
        };
        assert_eq!(err.to_string(), "field `summary` is used by thought, travel");
    }
}
