//! Application error types shared by every layer.
//!
//! Database driver errors are classified at the persistence boundary into
//! [`AppError::Constraint`]; repositories then translate the constraint
//! classes they understand into domain conditions. Everything else stays an
//! opaque persistence failure.

use std::fmt;

use thiserror::Error;

use crate::pagination::CursorError;
use crate::validation::ValidationErrors;

/// Catalog resource kinds, used to tag domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    House,
    NoteGroup,
    Note,
    Perfumer,
    Perfume,
}

impl Resource {
    /// Capitalized label used in client-facing messages ("House already exists.").
    pub fn label(&self) -> &'static str {
        match self {
            Resource::House => "House",
            Resource::NoteGroup => "Note group",
            Resource::Note => "Note",
            Resource::Perfumer => "Perfumer",
            Resource::Perfume => "Perfume",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::House => "house",
            Resource::NoteGroup => "note group",
            Resource::Note => "note",
            Resource::Perfumer => "perfumer",
            Resource::Perfume => "perfume",
        };
        f.write_str(name)
    }
}

/// Constraint classes the backend recognizes in driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// SQLSTATE 23505.
    Unique,
    /// SQLSTATE 23503.
    ForeignKey,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Unique => f.write_str("unique"),
            ConstraintKind::ForeignKey => f.write_str("foreign key"),
        }
    }
}

/// Application-level errors for perfume-db.
#[derive(Error, Debug)]
pub enum AppError {
    // Domain errors
    #[error("{resource} not found: {key}")]
    NotFound { resource: Resource, key: String },

    #[error("{0} already exists")]
    AlreadyExists(Resource),

    #[error("{resource} not found: {}", .ids.join(", "))]
    ReferenceNotFound {
        /// Request field the reference came from (e.g. `house_id`).
        field: &'static str,
        resource: Resource,
        ids: Vec<String>,
    },

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    // Database errors
    #[error("{kind} constraint violation: {message}")]
    Constraint {
        kind: ConstraintKind,
        constraint: Option<String>,
        message: String,
    },

    #[error("database query error: {message}")]
    Query { message: String, query: String },

    #[error("data integrity error: {0}")]
    Integrity(String),

    // Infrastructure errors
    #[error("public id generation failed: {0}")]
    IdGeneration(String),

    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a [`AppError::NotFound`] keyed by id or slug.
    pub fn not_found(resource: Resource, key: impl Into<String>) -> Self {
        AppError::NotFound {
            resource,
            key: key.into(),
        }
    }

    /// Returns the constraint class if this is a raw constraint violation.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            AppError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Translates raw unique/foreign-key violations into domain conditions.
    ///
    /// `on_unique` names the resource that already exists; `on_foreign_key`
    /// names the request field and the missing referenced resource. Any
    /// other error is returned unchanged.
    pub fn map_constraint(
        self,
        on_unique: Option<Resource>,
        on_foreign_key: Option<(&'static str, Resource, Vec<String>)>,
    ) -> Self {
        match (self.constraint_kind(), on_unique, on_foreign_key) {
            (Some(ConstraintKind::Unique), Some(resource), _) => AppError::AlreadyExists(resource),
            (Some(ConstraintKind::ForeignKey), _, Some((field, resource, ids))) => {
                AppError::ReferenceNotFound {
                    field,
                    resource,
                    ids,
                }
            }
            _ => self,
        }
    }
}
