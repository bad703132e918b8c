//! Repository contract
//!
//! The capability set every repository exposes for its model type. The only
//! implementation shipped here is [`BaseRepository`](crate::BaseRepository),
//! which derives all of it from a store and a model factory.

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::model::{Fields, Model};
use crate::pagination::LengthAwarePage;
use crate::query::{QueryBuilder, SearchParams};
use crate::store::ModelStore;

/// CRUD and search operations over a single model type
#[async_trait]
pub trait Repository<M: Model>: Send + Sync {
    /// Store the repository delegates to
    type Store: ModelStore<M>;

    /// Identifier of the managed model type
    fn model(&self) -> &'static str;

    /// A new, empty model instance
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ModelResolution` if the factory cannot build one
    fn make(&self) -> Result<M, PersistenceError>;

    /// A fresh, unfiltered query builder for the model type
    fn query(&self) -> QueryBuilder<'_, M, Self::Store>;

    /// Persists a new record and returns it with its generated key
    async fn create(&self, fields: Fields) -> Result<M, PersistenceError>;

    /// Deletes the record with the given key
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no record has that key
    async fn delete(&self, key: &M::Key) -> Result<bool, PersistenceError>;

    /// Applies `fields` to the record and returns it as re-read from storage
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no record has that key
    async fn update(&self, key: &M::Key, fields: Fields) -> Result<M, PersistenceError>;

    /// The record with the given key, or `None`
    async fn find(&self, key: &M::Key) -> Result<Option<M>, PersistenceError>;

    /// The record with the given key
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no record has that key
    async fn find_or_fail(&self, key: &M::Key) -> Result<M, PersistenceError>;

    /// Every record of the model type
    async fn all(&self) -> Result<Vec<M>, PersistenceError>;

    /// Query builder filtered by equality on each search parameter
    fn search_builder(&self, params: &SearchParams) -> QueryBuilder<'_, M, Self::Store>;

    /// First page of `search_builder(params)`; `per_page` defaults to `M::PER_PAGE`
    async fn search_paginated(
        &self,
        params: &SearchParams,
        per_page: Option<u32>,
    ) -> Result<LengthAwarePage<M>, PersistenceError>;

    /// The given 1-based page of `search_builder(params)`
    async fn search_paginated_page(
        &self,
        params: &SearchParams,
        per_page: Option<u32>,
        page: u32,
    ) -> Result<LengthAwarePage<M>, PersistenceError>;
}
