//! Generic repository implementation
//!
//! `BaseRepository<M, S>` implements the whole [`Repository`] contract for
//! any model `M` on top of any store `S`. Binding a repository to a model is
//! a matter of naming the type:
//!
//! ```rust,ignore
//! type UserRepository = BaseRepository<User, PgModelStore>;
//!
//! let users = UserRepository::new(PgModelStore::new(pool));
//! let ada = users.create(attributes).await?;
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::contract::Repository;
use crate::error::PersistenceError;
use crate::model::{fillable_attributes, Fields, Model};
use crate::pagination::LengthAwarePage;
use crate::query::{QueryBuilder, SearchParams};
use crate::store::ModelStore;

/// Builds empty model instances for `Repository::make`
pub type ModelFactory<M> = Arc<dyn Fn() -> Result<M, PersistenceError> + Send + Sync>;

/// Repository over a single model type backed by a `ModelStore`
///
/// Holds no state besides the store handle and the factory: no caching,
/// no unit of work. Cloning is as cheap as cloning the store.
pub struct BaseRepository<M: Model, S> {
    store: S,
    factory: ModelFactory<M>,
}

impl<M: Model, S: ModelStore<M>> BaseRepository<M, S> {
    /// Creates a repository whose `make` uses `factory`
    ///
    /// # Arguments
    ///
    /// * `store` - Store the repository delegates to
    /// * `factory` - Produces empty model instances
    pub fn with_factory<F>(store: S, factory: F) -> Self
    where
        F: Fn() -> Result<M, PersistenceError> + Send + Sync + 'static,
    {
        Self {
            store,
            factory: Arc::new(factory),
        }
    }

    /// Returns the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn fill(&self, fields: Fields) -> Fields {
        let (kept, dropped) = fillable_attributes::<M>(fields);
        if !dropped.is_empty() {
            debug!(model = M::NAME, ?dropped, "Discarding attributes outside the fillable list");
        }
        kept
    }

    /// Key the refreshed record will be found under after `update`
    ///
    /// Only called once the store has accepted the write, so a key the model
    /// cannot hold is reported as a rejected write.
    fn key_after_update(&self, current: &M::Key, new_key: Option<Value>) -> Result<M::Key, PersistenceError> {
        match new_key {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                PersistenceError::constraint(format!(
                    "{}.{} cannot hold the new key: {}",
                    M::TABLE,
                    M::PRIMARY_KEY,
                    e
                ))
            }),
            None => Ok(current.clone()),
        }
    }
}

impl<M: Model + Default, S: ModelStore<M>> BaseRepository<M, S> {
    /// Creates a repository whose `make` returns `M::default()`
    pub fn new(store: S) -> Self {
        Self::with_factory(store, || Ok(M::default()))
    }
}

impl<M: Model, S: Clone> Clone for BaseRepository<M, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<M: Model, S: fmt::Debug> fmt::Debug for BaseRepository<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseRepository")
            .field("model", &M::NAME)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<M: Model, S: ModelStore<M>> Repository<M> for BaseRepository<M, S> {
    type Store = S;

    fn model(&self) -> &'static str {
        M::NAME
    }

    fn make(&self) -> Result<M, PersistenceError> {
        (self.factory)()
    }

    fn query(&self) -> QueryBuilder<'_, M, S> {
        QueryBuilder::new(&self.store)
    }

    #[instrument(skip(self, fields), fields(model = M::NAME))]
    async fn create(&self, fields: Fields) -> Result<M, PersistenceError> {
        let attributes = self.fill(fields);
        debug!(attributes = attributes.len(), "Creating record");
        self.store.insert(attributes).await
    }

    #[instrument(skip(self), fields(model = M::NAME, key = %key))]
    async fn delete(&self, key: &M::Key) -> Result<bool, PersistenceError> {
        let record = self.find_or_fail(key).await?;
        self.store.delete(record.key()).await
    }

    #[instrument(skip(self, fields), fields(model = M::NAME, key = %key))]
    async fn update(&self, key: &M::Key, fields: Fields) -> Result<M, PersistenceError> {
        let record = self.find_or_fail(key).await?;
        let attributes = self.fill(fields);
        let new_key = attributes.get(M::PRIMARY_KEY).cloned();

        if !self.store.update(record.key(), attributes).await? {
            return Err(PersistenceError::not_found(M::NAME, key));
        }
        let refresh_key = self.key_after_update(record.key(), new_key)?;

        // Re-read so storage-side defaults and triggers are reflected
        self.store
            .find(&refresh_key)
            .await?
            .ok_or_else(|| PersistenceError::not_found(M::NAME, &refresh_key))
    }

    async fn find(&self, key: &M::Key) -> Result<Option<M>, PersistenceError> {
        self.store.find(key).await
    }

    async fn find_or_fail(&self, key: &M::Key) -> Result<M, PersistenceError> {
        self.store
            .find(key)
            .await?
            .ok_or_else(|| PersistenceError::not_found(M::NAME, key))
    }

    async fn all(&self) -> Result<Vec<M>, PersistenceError> {
        self.query().get().await
    }

    fn search_builder(&self, params: &SearchParams) -> QueryBuilder<'_, M, S> {
        self.query().where_all(params)
    }

    async fn search_paginated(
        &self,
        params: &SearchParams,
        per_page: Option<u32>,
    ) -> Result<LengthAwarePage<M>, PersistenceError> {
        self.search_paginated_page(params, per_page, 1).await
    }

    #[instrument(skip(self, params), fields(model = M::NAME, filters = params.len()))]
    async fn search_paginated_page(
        &self,
        params: &SearchParams,
        per_page: Option<u32>,
        page: u32,
    ) -> Result<LengthAwarePage<M>, PersistenceError> {
        self.search_builder(params).paginate(per_page, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Tag {
        id: i64,
        label: String,
    }

    impl Model for Tag {
        type Key = i64;
        const NAME: &'static str = "Tag";
        const TABLE: &'static str = "tags";

        fn key(&self) -> &i64 {
            &self.id
        }
    }

    fn repo() -> BaseRepository<Tag, InMemoryStore> {
        BaseRepository::new(InMemoryStore::new())
    }

    #[test]
    fn test_refresh_key_defaults_to_current() {
        assert_eq!(repo().key_after_update(&3, None).unwrap(), 3);
        assert_eq!(repo().key_after_update(&3, Some(json!(9))).unwrap(), 9);
    }

    #[test]
    fn test_undecodable_refresh_key_is_constraint_violation() {
        let error = repo().key_after_update(&3, Some(json!("abc"))).unwrap_err();
        assert!(error.is_constraint_violation());
        assert!(error.to_string().contains("tags.id"));
    }
}
