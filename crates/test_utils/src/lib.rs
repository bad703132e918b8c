//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixture models, and helpers for the
//! repository test suites.
//!
//! # Modules
//!
//! - `fixtures`: Fixture models, their schema, and canned attribute maps
//! - `builders`: Builder patterns for attribute maps
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for repository results
//! - `generators`: Property-based test data generators
//! - `telemetry`: Tracing subscriber for tests

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;
pub mod telemetry;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
pub use telemetry::init_tracing;
