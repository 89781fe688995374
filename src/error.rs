//! Structured errors returned by the record store and the form controller.
//!
//! Every variant is recoverable: the terminal UI renders the message in the
//! footer (and inside the open form, when there is one) and keeps running.

use rusqlite::{Error as SqlError, ErrorCode};
use thiserror::Error;

use crate::models::RecordKind;

/// Errors surfaced to the caller of any store or controller operation.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Malformed or missing input. The user corrects the field and retries.
    #[error("{message}")]
    Validation { message: String },

    /// The targeted record no longer exists. Callers refresh their list so
    /// the view converges with storage.
    #[error("{kind} {id} not found.")]
    NotFound { kind: RecordKind, id: i64 },

    /// Storage could not be opened, stayed locked past the busy timeout, or
    /// failed in some other way.
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    /// A reference points at a record that does not exist, or a delete was
    /// refused because other records still point at the target.
    #[error("{message}")]
    Integrity { message: String },
}

impl RecordError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(kind: RecordKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// True for errors after which the caller should reload its record list.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<SqlError> for RecordError {
    /// Constraint violations become integrity errors; anything else means
    /// the database could not serve the request.
    fn from(err: SqlError) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::integrity(err.to_string()),
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                Self::unavailable(format!("database is locked by another process ({err})"))
            }
            _ => Self::unavailable(err.to_string()),
        }
    }
}

/// Result alias used across the persistence and controller layers.
pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = RecordError::not_found(RecordKind::Customer, 7);
        assert_eq!(err.to_string(), "Customer 7 not found.");
        assert!(err.is_not_found());
    }

    #[test]
    fn busy_sqlite_error_maps_to_unavailable() {
        let err = SqlError::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(
            RecordError::from(err),
            RecordError::Unavailable { .. }
        ));
    }

    #[test]
    fn constraint_violation_maps_to_integrity() {
        let err = SqlError::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("FOREIGN KEY constraint failed".to_string()),
        );
        assert!(matches!(
            RecordError::from(err),
            RecordError::Integrity { .. }
        ));
    }
}
