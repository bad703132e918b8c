//! PostgreSQL model store
//!
//! `PgModelStore` implements `ModelStore<M>` for every `Model` over a single
//! connection pool. There is no per-model code: rows are read as `jsonb`
//! and deserialised with serde, and writes hand Postgres a `jsonb` record to
//! cast into the table's column types (see [`crate::sql`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgModelStore};
//! use repository_core::{BaseRepository, Repository};
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! let users: BaseRepository<User, _> = BaseRepository::new(PgModelStore::new(pool));
//! let page = users.search_paginated(&params, None).await?;
//! ```

use async_trait::async_trait;
use repository_core::model::key_value;
use repository_core::{Fields, Model, ModelStore, PersistenceError, Query};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::error::classify;
use crate::sql::TableRef;

/// Generic PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgModelStore {
    pool: PgPool,
}

impl PgModelStore {
    /// Creates a new store with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table<M: Model>() -> Result<TableRef, PersistenceError> {
        TableRef::new(M::TABLE, M::PRIMARY_KEY)
    }
}

fn decode<M: Model>(row: Value) -> Result<M, PersistenceError> {
    Ok(serde_json::from_value(row)?)
}

#[async_trait]
impl<M: Model> ModelStore<M> for PgModelStore {
    #[instrument(skip(self, fields), fields(table = M::TABLE))]
    async fn insert(&self, fields: Fields) -> Result<M, PersistenceError> {
        let mut builder = Self::table::<M>()?.insert(fields)?;
        let row: Value = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        debug!("Inserted row");
        decode(row)
    }

    #[instrument(skip(self), fields(table = M::TABLE, key = %key))]
    async fn find(&self, key: &M::Key) -> Result<Option<M>, PersistenceError> {
        let mut builder = Self::table::<M>()?.select_by_key(key_value::<M>(key)?);
        let row: Option<Value> = builder
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        row.map(decode).transpose()
    }

    #[instrument(skip(self, fields), fields(table = M::TABLE, key = %key))]
    async fn update(&self, key: &M::Key, fields: Fields) -> Result<bool, PersistenceError> {
        let mut builder = Self::table::<M>()?.update(key_value::<M>(key)?, fields)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        debug!(rows_affected = result.rows_affected(), "Updated row");
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(table = M::TABLE, key = %key))]
    async fn delete(&self, key: &M::Key) -> Result<bool, PersistenceError> {
        let mut builder = Self::table::<M>()?.delete(key_value::<M>(key)?);
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        debug!(rows_affected = result.rows_affected(), "Deleted row");
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, query), fields(table = M::TABLE, filters = query.wheres().len()))]
    async fn fetch(&self, query: &Query) -> Result<Vec<M>, PersistenceError> {
        let mut builder = Self::table::<M>()?.select(query)?;
        let rows: Vec<Value> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        rows.into_iter().map(decode).collect()
    }

    #[instrument(skip(self, query), fields(table = M::TABLE, filters = query.wheres().len()))]
    async fn count(&self, query: &Query) -> Result<u64, PersistenceError> {
        let mut builder = Self::table::<M>()?.count(query)?;
        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
