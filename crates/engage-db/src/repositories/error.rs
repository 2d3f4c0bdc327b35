//! Error handling utilities for repositories

use engage_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// True when the error is a violated unique constraint
pub fn is_unique_violation(e: &SqlxError) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Map a foreign-key violation on the target column to `TargetNotFound`
pub fn map_target_fk<F>(e: SqlxError, on_missing_target: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if e
        .as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
    {
        return on_missing_target();
    }
    map_db_error(e)
}
