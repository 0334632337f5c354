//! Database error type

use crate::password::PasswordError;

/// Store-level failure, distinguishing "absent" from "broken".
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} '{name}' already exists")]
    Conflict { resource: &'static str, name: String },

    #[error("unknown tags: {}", .0.join(", "))]
    UnknownTags(Vec<String>),

    #[error("credential error: {0}")]
    Password(#[from] PasswordError),
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Map a UNIQUE constraint violation to `Conflict`, pass anything else through.
pub(crate) fn conflict_on_unique(
    err: sqlx::Error,
    resource: &'static str,
    name: &str,
) -> DbError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict {
            resource,
            name: name.to_owned(),
        },
        _ => DbError::Sqlx(err),
    }
}
