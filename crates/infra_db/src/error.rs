//! Database error types
//!
//! This module defines the error types for database operations and how they
//! are classified into the store-level `PersistenceError`.

use repository_core::PersistenceError;
use thiserror::Error;

/// Database operation errors
///
/// This enum represents all possible database-related errors, including
/// connection issues, query failures, and constraint violations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// NOT NULL, CHECK or exclusion constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Value rejected by the column type (bad format, out of range)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if the database rejected the written data
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
                | DatabaseError::InvalidData(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Classifies a PostgreSQL SQLSTATE code
    ///
    /// Class 23 (integrity constraint violation) and class 22 (data
    /// exception) are write rejections; everything else is a query failure.
    /// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>.
    pub fn from_sqlstate(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "23505" => DatabaseError::DuplicateEntry(message),
            "23503" => DatabaseError::ForeignKeyViolation(message),
            c if c.starts_with("23") => DatabaseError::ConstraintViolation(message),
            c if c.starts_with("22") => DatabaseError::InvalidData(message),
            _ => DatabaseError::QueryFailed(message),
        }
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Tls(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => DatabaseError::from_sqlstate(code.as_ref(), db_err.message()),
                None => DatabaseError::QueryFailed(db_err.message().to_string()),
            },
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

/// Converts database errors into the store-level error kinds
///
/// - constraint and data rejections -> `PersistenceError::ConstraintViolation`
/// - `NotFound` -> `PersistenceError::NotFound`
/// - everything else -> `PersistenceError::Backend`
impl From<DatabaseError> for PersistenceError {
    fn from(error: DatabaseError) -> Self {
        if error.is_constraint_violation() {
            return PersistenceError::ConstraintViolation(error.to_string());
        }
        match error {
            DatabaseError::NotFound(what) => PersistenceError::NotFound {
                model: "record".to_string(),
                key: what,
            },
            other => PersistenceError::Backend {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

/// Classifies a raw SQLx error straight into a `PersistenceError`
pub(crate) fn classify(error: sqlx::Error) -> PersistenceError {
    let classified = DatabaseError::from(&error);
    match classified {
        DatabaseError::QueryFailed(_) => PersistenceError::Backend {
            message: classified.to_string(),
            source: Some(Box::new(error)),
        },
        other => other.into(),
    }
}
