//! Persistence error types shared by every store and repository

use std::fmt;
use thiserror::Error;

/// Error type for store and repository operations
///
/// Stores produce these errors and repositories hand them back to the caller
/// untouched. `NotFound` and `ConstraintViolation` are the two kinds callers
/// are expected to branch on; the rest describe misuse or transport problems.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No record matches the given primary key
    #[error("No query results for model [{model}] {key}")]
    NotFound {
        model: String,
        key: String,
    },

    /// The store rejected a write (missing required attribute, duplicate, bad value)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The model factory could not produce an instance
    #[error("Unable to resolve model: {0}")]
    ModelResolution(String),

    /// The query cannot be expressed against the store
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A stored row could not be mapped to or from the model type
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend failed for reasons unrelated to the data
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PersistenceError {
    /// Creates a NotFound error for a model name and key
    ///
    /// # Example
    ///
    /// ```rust
    /// use repository_core::PersistenceError;
    ///
    /// let error = PersistenceError::not_found("User", 42);
    /// assert!(error.is_not_found());
    /// assert!(error.to_string().contains("User"));
    /// ```
    pub fn not_found(model: impl Into<String>, key: impl fmt::Display) -> Self {
        PersistenceError::NotFound {
            model: model.into(),
            key: key.to_string(),
        }
    }

    /// Creates a ConstraintViolation error
    pub fn constraint(message: impl Into<String>) -> Self {
        PersistenceError::ConstraintViolation(message.into())
    }

    /// Creates an InvalidQuery error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        PersistenceError::InvalidQuery(message.into())
    }

    /// Creates a Backend error without an underlying source
    pub fn backend(message: impl Into<String>) -> Self {
        PersistenceError::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if no record matched the requested key
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::NotFound { .. })
    }

    /// Returns true if the store rejected a write
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, PersistenceError::ConstraintViolation(_))
    }
}
