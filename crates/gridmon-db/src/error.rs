//! Error types for the gridmon-db crate.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Could not establish or acquire a connection. The server is down,
    /// unreachable, or the credentials are wrong.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A query failed to execute: bad SQL, a constraint violation, or a
    /// parameter mismatch.
    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    /// The named row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching the database.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl DbError {
    /// Check if this error indicates a connection problem.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_))
    }

    /// Check if this error indicates a query problem.
    #[must_use]
    pub fn is_query_error(&self) -> bool {
        matches!(self, DbError::QueryFailed(_))
    }
}

/// Convenience result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
