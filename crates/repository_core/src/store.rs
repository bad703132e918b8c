//! Store port
//!
//! `ModelStore` is the capability a persistence backend offers for one model
//! type. Repositories are written only against this trait, so the same
//! repository runs over PostgreSQL in production and over the in-memory
//! store in tests.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   BaseRepository<M, S>       │
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │       ModelStore<M>          │
//! └──────────────────────────────┘
//!        ▲                ▲
//!        │                │
//! ┌──────┴───────┐ ┌──────┴───────┐
//! │ InMemoryStore│ │ PgModelStore │
//! └──────────────┘ └──────────────┘
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::PersistenceError;
use crate::model::{Fields, Model};
use crate::query::Query;

/// Persistence primitives for a single model type
#[async_trait]
pub trait ModelStore<M: Model>: Send + Sync {
    /// Inserts a record and returns it as stored, generated key included
    async fn insert(&self, fields: Fields) -> Result<M, PersistenceError>;

    /// Looks a record up by primary key
    async fn find(&self, key: &M::Key) -> Result<Option<M>, PersistenceError>;

    /// Applies `fields` to the record; `false` when no record has that key
    async fn update(&self, key: &M::Key, fields: Fields) -> Result<bool, PersistenceError>;

    /// Removes the record; `false` when no record has that key
    async fn delete(&self, key: &M::Key) -> Result<bool, PersistenceError>;

    /// Records matching `query` in primary-key order, honouring limit and offset
    async fn fetch(&self, query: &Query) -> Result<Vec<M>, PersistenceError>;

    /// Number of records matching `query`, ignoring limit and offset
    async fn count(&self, query: &Query) -> Result<u64, PersistenceError>;
}

#[async_trait]
impl<M, S> ModelStore<M> for Arc<S>
where
    M: Model,
    S: ModelStore<M> + ?Sized,
{
    async fn insert(&self, fields: Fields) -> Result<M, PersistenceError> {
        (**self).insert(fields).await
    }

    async fn find(&self, key: &M::Key) -> Result<Option<M>, PersistenceError> {
        (**self).find(key).await
    }

    async fn update(&self, key: &M::Key, fields: Fields) -> Result<bool, PersistenceError> {
        (**self).update(key, fields).await
    }

    async fn delete(&self, key: &M::Key) -> Result<bool, PersistenceError> {
        (**self).delete(key).await
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<M>, PersistenceError> {
        (**self).fetch(query).await
    }

    async fn count(&self, query: &Query) -> Result<u64, PersistenceError> {
        (**self).count(query).await
    }
}
