//! Custom Test Assertions
//!
//! Assertion helpers for repository results that print the offending value
//! instead of a bare `assert!` failure.

use repository_core::{Model, PersistenceError};
use std::fmt::Debug;

/// Asserts that a result failed with `PersistenceError::NotFound`
///
/// # Panics
///
/// Panics if the result is `Ok` or carries any other error kind
pub fn assert_not_found<T: Debug>(result: Result<T, PersistenceError>) {
    match result {
        Err(error) if error.is_not_found() => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

/// Asserts that a result failed with `PersistenceError::ConstraintViolation`
///
/// # Panics
///
/// Panics if the result is `Ok` or carries any other error kind
pub fn assert_constraint_violation<T: Debug>(result: Result<T, PersistenceError>) {
    match result {
        Err(error) if error.is_constraint_violation() => {}
        other => panic!("expected ConstraintViolation, got {:?}", other),
    }
}

/// Asserts that two model lists hold the same keys in the same order
pub fn assert_same_keys<M: Model>(actual: &[M], expected: &[M]) {
    let actual_keys: Vec<&M::Key> = actual.iter().map(|m| m.key()).collect();
    let expected_keys: Vec<&M::Key> = expected.iter().map(|m| m.key()).collect();
    assert_eq!(actual_keys, expected_keys, "model keys differ");
}
