//! Model capability trait and attribute maps
//!
//! A model is any serde-serialisable record type with a primary key. The
//! associated constants carry the metadata a store needs to persist it: where
//! it lives, how it is keyed, and how large a page of it should be.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::PersistenceError;

/// Attribute name → value map used for writes and equality searches
pub type Fields = serde_json::Map<String, Value>;

/// Page size used when neither the caller nor the model picks one
pub const DEFAULT_PER_PAGE: u32 = 15;

/// A persisted record type managed by a repository
///
/// # Example
///
/// ```rust
/// use repository_core::Model;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl Model for Tag {
///     type Key = i64;
///     const NAME: &'static str = "Tag";
///     const TABLE: &'static str = "tags";
///
///     fn key(&self) -> &i64 {
///         &self.id
///     }
/// }
///
/// assert_eq!(Tag::PRIMARY_KEY, "id");
/// assert_eq!(Tag::PER_PAGE, 15);
/// ```
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Primary key type
    type Key: Serialize + DeserializeOwned + fmt::Display + fmt::Debug + Clone + PartialEq + Send + Sync + 'static;

    /// Identifier reported by `Repository::model`
    const NAME: &'static str;

    /// Table (or collection) the records live in
    const TABLE: &'static str;

    /// Attribute holding the primary key
    const PRIMARY_KEY: &'static str = "id";

    /// Default page size for paginated searches
    const PER_PAGE: u32 = DEFAULT_PER_PAGE;

    /// Attributes accepted by mass assignment; `None` accepts every attribute
    const FILLABLE: Option<&'static [&'static str]> = None;

    /// Returns the primary key value
    fn key(&self) -> &Self::Key;
}

/// Splits `fields` into the attributes `M` accepts for mass assignment and
/// the names of the ones it drops
pub fn fillable_attributes<M: Model>(fields: Fields) -> (Fields, Vec<String>) {
    let Some(allowed) = M::FILLABLE else {
        return (fields, Vec::new());
    };

    let mut kept = Fields::new();
    let mut dropped = Vec::new();
    for (name, value) in fields {
        if allowed.contains(&name.as_str()) {
            kept.insert(name, value);
        } else {
            dropped.push(name);
        }
    }
    (kept, dropped)
}

/// Serialises a model into its attribute map
pub fn to_fields<M: Model>(model: &M) -> Result<Fields, PersistenceError> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(map),
        other => Err(PersistenceError::invalid_query(format!(
            "model [{}] serialised to {} instead of an attribute map",
            M::NAME,
            json_kind(&other)
        ))),
    }
}

/// Deserialises a model from its attribute map
pub fn from_fields<M: Model>(fields: Fields) -> Result<M, PersistenceError> {
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Serialises a primary key into the JSON value stores compare against
pub fn key_value<M: Model>(key: &M::Key) -> Result<Value, PersistenceError> {
    Ok(serde_json::to_value(key)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
