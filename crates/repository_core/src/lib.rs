//! Repository Core - generic repositories over pluggable model stores
//!
//! This crate provides the data-access building blocks used by applications:
//! - The `Repository` contract and its generic `BaseRepository` implementation
//! - The `ModelStore` port that persistence backends implement
//! - An equality-only query builder with length-aware pagination
//! - An in-memory store for tests and database-less deployments

pub mod model;
pub mod error;
pub mod query;
pub mod pagination;
pub mod store;
pub mod contract;
pub mod base;
pub mod memory;

pub use model::{Fields, Model, DEFAULT_PER_PAGE};
pub use error::PersistenceError;
pub use query::{Query, QueryBuilder, SearchParams, WhereClause};
pub use pagination::LengthAwarePage;
pub use store::ModelStore;
pub use contract::Repository;
pub use base::{BaseRepository, ModelFactory};
pub use memory::InMemoryStore;
