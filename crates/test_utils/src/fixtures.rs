//! Pre-built Test Fixtures
//!
//! Fixture models with a matching PostgreSQL schema, plus ready-made
//! attribute maps. The serde defaults on the models mirror the column
//! defaults in [`SCHEMA_SQL`], so the in-memory and Postgres stores
//! produce the same records for the same input.

use chrono::{DateTime, Utc};
use repository_core::{Fields, Model};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Schema for the fixture models
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE,
    role TEXT NOT NULL DEFAULT 'member',
    active BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE TABLE IF NOT EXISTS articles (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    author_id BIGINT NOT NULL,
    published BOOLEAN NOT NULL DEFAULT FALSE,
    views BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

/// Tables created by [`SCHEMA_SQL`]
pub const FIXTURE_TABLES: &[&str] = &["users", "articles"];

fn default_role() -> String {
    "member".to_string()
}

/// Integer-keyed fixture model without a fillable list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub active: bool,
}

impl Model for User {
    type Key = i64;
    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const PER_PAGE: u32 = 10;

    fn key(&self) -> &i64 {
        &self.id
    }
}

/// UUID-keyed fixture model with a fillable list (`views` is guarded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub author_id: i64,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub views: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            title: String::new(),
            author_id: 0,
            published: false,
            views: 0,
            created_at: Utc::now(),
        }
    }
}

impl Model for Article {
    type Key = Uuid;
    const NAME: &'static str = "Article";
    const TABLE: &'static str = "articles";
    const FILLABLE: Option<&'static [&'static str]> =
        Some(&["id", "title", "author_id", "published"]);

    fn key(&self) -> &Uuid {
        &self.id
    }
}

/// Converts a JSON object literal into an attribute map
///
/// # Panics
///
/// Panics if `value` is not a JSON object
pub fn attributes(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object of attributes, got {other}"),
    }
}

/// Fixture attribute maps for `User`
pub struct UserFixtures;

impl UserFixtures {
    /// The canonical first user
    pub fn ada() -> Fields {
        attributes(json!({"name": "Ada"}))
    }

    /// A second user with an email and an admin role
    pub fn grace() -> Fields {
        attributes(json!({
            "name": "Grace",
            "email": "grace@example.com",
            "role": "admin",
            "active": true
        }))
    }

    /// A third user sharing Grace's role but inactive
    pub fn edsger() -> Fields {
        attributes(json!({
            "name": "Edsger",
            "email": "edsger@example.com",
            "role": "admin",
            "active": false
        }))
    }
}

/// Fixture attribute maps for `Article`
pub struct ArticleFixtures;

impl ArticleFixtures {
    /// A published article with a fresh key
    pub fn published(author_id: i64) -> Fields {
        attributes(json!({
            "id": Uuid::new_v4(),
            "title": "Notes on the Analytical Engine",
            "author_id": author_id,
            "published": true
        }))
    }

    /// A draft article with a fresh key
    pub fn draft(author_id: i64) -> Fields {
        attributes(json!({
            "id": Uuid::new_v4(),
            "title": "Draft",
            "author_id": author_id
        }))
    }
}
