//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL backend for `repository_core`: a
//! connection pool, error classification, and `PgModelStore`, a single
//! `ModelStore` implementation that serves every `Model` type.
//!
//! # Architecture
//!
//! Repositories never see SQL. They talk to `ModelStore`, and `PgModelStore`
//! turns those calls into parameterised statements that move rows through
//! `jsonb`, so adding a model needs a table and a `Model` impl, nothing here.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgModelStore};
//! use repository_core::BaseRepository;
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! let users = BaseRepository::<User, _>::new(PgModelStore::new(pool));
//! ```

pub mod pool;
pub mod error;
pub mod sql;
pub mod store;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use store::PgModelStore;
