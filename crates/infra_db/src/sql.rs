//! SQL generation for the generic Postgres store
//!
//! Rows travel as `jsonb`: reads select `to_jsonb(t)`, writes and key/filter
//! comparisons go through `jsonb_populate_record(NULL::table, $n)` so every
//! value is cast to its column type by Postgres itself. Identifiers are
//! validated and double-quoted; values are always bound, never inlined.

use repository_core::{Fields, PersistenceError, Query};
use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder};

const MAX_IDENTIFIER_LEN: usize = 63;

/// Quotes a column or table identifier, accepting an optional schema prefix
///
/// # Errors
///
/// Returns `PersistenceError::InvalidQuery` unless every dot-separated part
/// matches `[A-Za-z_][A-Za-z0-9_]*` and fits in 63 bytes
pub fn quote_identifier(name: &str) -> Result<String, PersistenceError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(PersistenceError::invalid_query(format!(
            "identifier '{}' has too many parts",
            name
        )));
    }

    let mut quoted = Vec::with_capacity(parts.len());
    for part in parts {
        let mut chars = part.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_start || !valid_rest || part.len() > MAX_IDENTIFIER_LEN {
            return Err(PersistenceError::invalid_query(format!(
                "'{}' is not a valid identifier",
                name
            )));
        }
        quoted.push(format!("\"{}\"", part));
    }
    Ok(quoted.join("."))
}

/// Quotes a bare column identifier (no schema prefix)
pub fn quote_column(name: &str) -> Result<String, PersistenceError> {
    if name.contains('.') {
        return Err(PersistenceError::invalid_query(format!(
            "column '{}' must not be qualified",
            name
        )));
    }
    quote_identifier(name)
}

/// Validated, quoted names for one model's table
#[derive(Debug, Clone)]
pub struct TableRef {
    table: String,
    primary_key: String,
    key_column: String,
}

impl TableRef {
    pub fn new(table: &str, primary_key: &str) -> Result<Self, PersistenceError> {
        Ok(Self {
            table: quote_identifier(table)?,
            primary_key: quote_column(primary_key)?,
            key_column: primary_key.to_string(),
        })
    }

    /// `(jsonb_populate_record(NULL::table, $n::jsonb))."column"`
    fn push_typed_value<'a>(
        &self,
        builder: &mut QueryBuilder<'a, Postgres>,
        quoted_column: &str,
        record: Value,
    ) {
        builder.push(format!("(jsonb_populate_record(NULL::{}, ", self.table));
        builder.push_bind(record);
        builder.push(format!("::jsonb)).{}", quoted_column));
    }

    fn push_key_condition<'a>(&self, builder: &mut QueryBuilder<'a, Postgres>, key: Value) {
        let mut record = Map::new();
        record.insert(self.key_column.clone(), key);
        builder.push(format!("t.{} = ", self.primary_key));
        self.push_typed_value(builder, &self.primary_key, Value::Object(record));
    }

    fn push_filters<'a>(
        &self,
        builder: &mut QueryBuilder<'a, Postgres>,
        query: &Query,
    ) -> Result<(), PersistenceError> {
        for (i, clause) in query.wheres().iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            let column = quote_column(&clause.column)?;
            if clause.value.is_null() {
                builder.push(format!("t.{} IS NULL", column));
            } else {
                let mut record = Map::new();
                record.insert(clause.column.clone(), clause.value.clone());
                builder.push(format!("t.{} = ", column));
                self.push_typed_value(builder, &column, Value::Object(record));
            }
        }
        Ok(())
    }

    /// `SELECT to_jsonb(t) ... WHERE pk = $1`
    pub fn select_by_key(&self, key: Value) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT to_jsonb(t) FROM {} AS t WHERE ", self.table));
        self.push_key_condition(&mut builder, key);
        builder
    }

    /// `SELECT to_jsonb(t) ... [WHERE ...] ORDER BY pk [LIMIT] [OFFSET]`
    pub fn select(&self, query: &Query) -> Result<QueryBuilder<'static, Postgres>, PersistenceError> {
        let mut builder = QueryBuilder::new(format!("SELECT to_jsonb(t) FROM {} AS t", self.table));
        self.push_filters(&mut builder, query)?;
        builder.push(format!(" ORDER BY t.{}", self.primary_key));
        if let Some(limit) = query.limit_value() {
            builder.push(" LIMIT ");
            builder.push_bind(to_i64(limit));
        }
        if let Some(offset) = query.offset_value() {
            builder.push(" OFFSET ");
            builder.push_bind(to_i64(offset));
        }
        Ok(builder)
    }

    /// `SELECT count(*) ... [WHERE ...]`
    pub fn count(&self, query: &Query) -> Result<QueryBuilder<'static, Postgres>, PersistenceError> {
        let mut builder = QueryBuilder::new(format!("SELECT count(*) FROM {} AS t", self.table));
        self.push_filters(&mut builder, &query.unbounded())?;
        Ok(builder)
    }

    /// `INSERT ... RETURNING to_jsonb(t)` for the given attributes only
    pub fn insert(&self, fields: Fields) -> Result<QueryBuilder<'static, Postgres>, PersistenceError> {
        if fields.is_empty() {
            return Ok(QueryBuilder::new(format!(
                "INSERT INTO {} AS t DEFAULT VALUES RETURNING to_jsonb(t)",
                self.table
            )));
        }

        let columns = quoted_columns(&fields)?;
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {} AS t ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{}, ",
            self.table,
            self.table,
            cols = columns
        ));
        builder.push_bind(Value::Object(fields));
        builder.push("::jsonb) RETURNING to_jsonb(t)");
        Ok(builder)
    }

    /// `UPDATE ... SET (cols) = (SELECT cols FROM jsonb_populate_record(...)) WHERE pk = ...`
    ///
    /// An empty attribute map still touches the row so the affected-row
    /// count reports whether it exists.
    pub fn update(
        &self,
        key: Value,
        fields: Fields,
    ) -> Result<QueryBuilder<'static, Postgres>, PersistenceError> {
        let mut builder = QueryBuilder::new(format!("UPDATE {} AS t SET ", self.table));
        if fields.is_empty() {
            builder.push(format!("{pk} = t.{pk}", pk = self.primary_key));
        } else {
            let columns = quoted_columns(&fields)?;
            builder.push(format!(
                "({cols}) = (SELECT {cols} FROM jsonb_populate_record(NULL::{}, ",
                self.table,
                cols = columns
            ));
            builder.push_bind(Value::Object(fields));
            builder.push("::jsonb))");
        }
        builder.push(" WHERE ");
        self.push_key_condition(&mut builder, key);
        Ok(builder)
    }

    /// `DELETE ... WHERE pk = ...`
    pub fn delete(&self, key: Value) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("DELETE FROM {} AS t WHERE ", self.table));
        self.push_key_condition(&mut builder, key);
        builder
    }
}

fn quoted_columns(fields: &Fields) -> Result<String, PersistenceError> {
    let columns = fields
        .keys()
        .map(|name| quote_column(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns.join(", "))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
