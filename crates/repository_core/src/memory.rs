//! In-memory model store
//!
//! Keeps one table per `Model::TABLE` in process memory, rows ordered by
//! primary key. Rows are stored in the model's own serialised form, so
//! attributes the model does not know about are dropped and serde defaults
//! behave like column defaults.
//!
//! Integer keys that are not supplied on insert are generated as
//! `max + 1`. Required and unique attributes can be declared per table to
//! reproduce the constraint violations a database would raise.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::PersistenceError;
use crate::model::{from_fields, key_value, to_fields, Fields, Model};
use crate::query::Query;
use crate::store::ModelStore;

/// Ordering key for rows: integers first, then everything else as text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum RowKey {
    Int(i64),
    Text(String),
}

impl RowKey {
    fn from_value(value: &Value) -> Result<Self, PersistenceError> {
        match value {
            Value::Null => Err(PersistenceError::constraint("primary key cannot be null")),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(RowKey::Int(i)),
                None => Ok(RowKey::Text(n.to_string())),
            },
            Value::String(s) => Ok(RowKey::Text(s.clone())),
            other => Ok(RowKey::Text(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TableConstraints {
    required: Vec<String>,
    unique: Vec<String>,
}

type Table = BTreeMap<RowKey, Fields>;

/// Process-local `ModelStore` for any model type
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    constraints: Arc<HashMap<String, TableConstraints>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares attributes that must be present and non-null in `table`
    pub fn require(mut self, table: &str, attributes: &[&str]) -> Self {
        Arc::make_mut(&mut self.constraints)
            .entry(table.to_string())
            .or_default()
            .required
            .extend(attributes.iter().map(|a| a.to_string()));
        self
    }

    /// Declares attributes whose non-null values must be unique in `table`
    pub fn unique(mut self, table: &str, attributes: &[&str]) -> Self {
        Arc::make_mut(&mut self.constraints)
            .entry(table.to_string())
            .or_default()
            .unique
            .extend(attributes.iter().map(|a| a.to_string()));
        self
    }

    /// Number of rows currently stored in `table`
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, BTreeMap::len)
    }

    /// Removes every row from `table`
    pub async fn truncate(&self, table: &str) {
        self.tables.write().await.remove(table);
    }

    fn constraints_for(&self, table: &str) -> Option<&TableConstraints> {
        self.constraints.get(table)
    }

    /// Normalises `fields` through the model type, rejecting rows it cannot represent
    fn canonical_row<M: Model>(fields: Fields) -> Result<(M, Fields), PersistenceError> {
        let model: M = from_fields(fields).map_err(|e| {
            PersistenceError::constraint(format!("{} row rejected: {}", M::TABLE, e))
        })?;
        let row = to_fields(&model)?;
        Ok((model, row))
    }

    fn check_constraints<M: Model>(
        &self,
        table: &Table,
        row: &Fields,
        own_key: Option<&RowKey>,
    ) -> Result<(), PersistenceError> {
        let Some(constraints) = self.constraints_for(M::TABLE) else {
            return Ok(());
        };

        for attribute in &constraints.required {
            if matches!(row.get(attribute), None | Some(Value::Null)) {
                return Err(PersistenceError::constraint(format!(
                    "{}.{} is required",
                    M::TABLE,
                    attribute
                )));
            }
        }

        for attribute in &constraints.unique {
            let Some(value) = row.get(attribute).filter(|v| !v.is_null()) else {
                continue;
            };
            let duplicate = table
                .iter()
                .filter(|(key, _)| Some(*key) != own_key)
                .any(|(_, other)| other.get(attribute) == Some(value));
            if duplicate {
                return Err(PersistenceError::constraint(format!(
                    "{}.{} must be unique, {} already exists",
                    M::TABLE,
                    attribute,
                    value
                )));
            }
        }

        Ok(())
    }
}

fn next_integer_key(table: &str, rows: &Table) -> Result<i64, PersistenceError> {
    let highest = rows
        .keys()
        .filter_map(|key| match key {
            RowKey::Int(i) => Some(*i),
            RowKey::Text(_) => None,
        })
        .max();
    match highest {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            PersistenceError::constraint(format!("{} key space exhausted after {}", table, max))
        }),
    }
}

fn row_key_of<M: Model>(row: &Fields) -> Result<RowKey, PersistenceError> {
    RowKey::from_value(row.get(M::PRIMARY_KEY).unwrap_or(&Value::Null))
}

#[async_trait]
impl<M: Model> ModelStore<M> for InMemoryStore {
    async fn insert(&self, mut fields: Fields) -> Result<M, PersistenceError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(M::TABLE.to_string()).or_default();

        if matches!(fields.get(M::PRIMARY_KEY), None | Some(Value::Null)) {
            let generated = next_integer_key(M::TABLE, table)?;
            fields.insert(M::PRIMARY_KEY.to_string(), Value::from(generated));
        }

        let (model, row) = Self::canonical_row::<M>(fields)?;
        let key = row_key_of::<M>(&row)?;
        if table.contains_key(&key) {
            return Err(PersistenceError::constraint(format!(
                "{}.{} must be unique, {} already exists",
                M::TABLE,
                M::PRIMARY_KEY,
                model.key()
            )));
        }
        self.check_constraints::<M>(table, &row, None)?;

        debug!(table = M::TABLE, key = %model.key(), "Inserted row");
        table.insert(key, row);
        Ok(model)
    }

    async fn find(&self, key: &M::Key) -> Result<Option<M>, PersistenceError> {
        let key = RowKey::from_value(&key_value::<M>(key)?)?;
        let tables = self.tables.read().await;
        match tables.get(M::TABLE).and_then(|table| table.get(&key)) {
            Some(row) => Ok(Some(from_fields(row.clone())?)),
            None => Ok(None),
        }
    }

    async fn update(&self, key: &M::Key, fields: Fields) -> Result<bool, PersistenceError> {
        let key = RowKey::from_value(&key_value::<M>(key)?)?;
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(M::TABLE) else {
            return Ok(false);
        };
        let Some(current) = table.get(&key) else {
            return Ok(false);
        };

        let mut merged = current.clone();
        merged.extend(fields);
        let (_, row) = Self::canonical_row::<M>(merged)?;
        let new_key = row_key_of::<M>(&row)?;

        if new_key != key && table.contains_key(&new_key) {
            return Err(PersistenceError::constraint(format!(
                "{}.{} must be unique, {} already exists",
                M::TABLE,
                M::PRIMARY_KEY,
                row.get(M::PRIMARY_KEY).unwrap_or(&Value::Null)
            )));
        }
        self.check_constraints::<M>(table, &row, Some(&key))?;

        table.remove(&key);
        table.insert(new_key, row);
        Ok(true)
    }

    async fn delete(&self, key: &M::Key) -> Result<bool, PersistenceError> {
        let key = RowKey::from_value(&key_value::<M>(key)?)?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(M::TABLE)
            .and_then(|table| table.remove(&key))
            .is_some())
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<M>, PersistenceError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(M::TABLE) else {
            return Ok(Vec::new());
        };

        let offset = usize::try_from(query.offset_value().unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit_value()
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        table
            .values()
            .filter(|row| query.matches(row))
            .skip(offset)
            .take(limit)
            .map(|row| from_fields(row.clone()))
            .collect()
    }

    async fn count(&self, query: &Query) -> Result<u64, PersistenceError> {
        let tables = self.tables.read().await;
        let matching = tables
            .get(M::TABLE)
            .map_or(0, |table| table.values().filter(|row| query.matches(row)).count());
        Ok(matching as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_keys_sort_before_text_keys() {
        let mut keys = vec![
            RowKey::Text("a".into()),
            RowKey::Int(10),
            RowKey::Int(2),
        ];
        keys.sort();

        assert_eq!(
            keys,
            vec![RowKey::Int(2), RowKey::Int(10), RowKey::Text("a".into())]
        );
    }

    #[test]
    fn test_next_integer_key_starts_at_one() {
        let mut table = Table::new();
        assert_eq!(next_integer_key("t", &table).unwrap(), 1);

        table.insert(RowKey::Int(4), Fields::new());
        table.insert(RowKey::Text("x".into()), Fields::new());
        assert_eq!(next_integer_key("t", &table).unwrap(), 5);
    }

    #[test]
    fn test_next_integer_key_reports_exhaustion() {
        let mut table = Table::new();
        table.insert(RowKey::Int(i64::MAX), Fields::new());

        let error = next_integer_key("t", &table).unwrap_err();
        assert!(error.is_constraint_violation());
    }

    #[test]
    fn test_null_key_is_rejected() {
        assert!(RowKey::from_value(&Value::Null).is_err());
    }
}
