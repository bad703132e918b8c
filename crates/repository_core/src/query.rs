//! Equality-only query builder
//!
//! A `Query` is plain data: equality clauses plus an optional window. A
//! `QueryBuilder` pairs it with a store so callers can compose clauses and
//! then execute (`get`, `first`, `count`, `paginate`).

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

use crate::error::PersistenceError;
use crate::model::{Fields, Model};
use crate::pagination::{self, LengthAwarePage};
use crate::store::ModelStore;

/// Attribute → expected value pairs for equality searches
pub type SearchParams = Fields;

/// One `column = value` clause; a `null` value matches missing or null attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhereClause {
    pub column: String,
    pub value: Value,
}

impl WhereClause {
    /// Returns true if the attribute map satisfies this clause
    pub fn matches(&self, row: &Fields) -> bool {
        match (&self.value, row.get(&self.column)) {
            (Value::Null, None) | (Value::Null, Some(Value::Null)) => true,
            (expected, Some(actual)) => expected == actual,
            (_, None) => false,
        }
    }
}

/// Store-agnostic description of a query over one model type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    wheres: Vec<WhereClause>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality clause
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.wheres.push(WhereClause {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Adds one equality clause per search parameter
    pub fn where_all(mut self, params: &SearchParams) -> Self {
        self.wheres.extend(params.iter().map(|(column, value)| WhereClause {
            column: column.clone(),
            value: value.clone(),
        }));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn wheres(&self) -> &[WhereClause] {
        &self.wheres
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Returns true if the attribute map satisfies every clause
    pub fn matches(&self, row: &Fields) -> bool {
        self.wheres.iter().all(|clause| clause.matches(row))
    }

    /// Same clauses without limit or offset
    pub fn unbounded(&self) -> Self {
        Self {
            wheres: self.wheres.clone(),
            limit: None,
            offset: None,
        }
    }
}

/// A query bound to the store that will execute it
pub struct QueryBuilder<'a, M, S: ?Sized> {
    store: &'a S,
    query: Query,
    _model: PhantomData<fn() -> M>,
}

impl<'a, M, S> QueryBuilder<'a, M, S>
where
    M: Model,
    S: ModelStore<M> + ?Sized,
{
    /// Creates an unfiltered query over `M`
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            query: Query::new(),
            _model: PhantomData,
        }
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query = self.query.where_eq(column, value);
        self
    }

    pub fn where_all(mut self, params: &SearchParams) -> Self {
        self.query = self.query.where_all(params);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.query = self.query.offset(offset);
        self
    }

    /// The query as composed so far
    pub fn to_query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    /// Executes the query
    pub async fn get(&self) -> Result<Vec<M>, PersistenceError> {
        self.store.fetch(&self.query).await
    }

    /// First matching record, if any
    pub async fn first(&self) -> Result<Option<M>, PersistenceError> {
        let query = self.query.clone().limit(1);
        Ok(self.store.fetch(&query).await?.into_iter().next())
    }

    /// Number of matching records
    pub async fn count(&self) -> Result<u64, PersistenceError> {
        self.store.count(&self.query.unbounded()).await
    }

    /// Executes one page of the query
    ///
    /// # Arguments
    ///
    /// * `per_page` - Page size; `None` uses `M::PER_PAGE`
    /// * `page` - 1-based page number; `0` is treated as page 1
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidQuery` for a page size of zero
    pub async fn paginate(
        &self,
        per_page: Option<u32>,
        page: u32,
    ) -> Result<LengthAwarePage<M>, PersistenceError> {
        let per_page = pagination::resolve_per_page::<M>(per_page)?;
        let page = page.max(1);

        let base = self.query.unbounded();
        let total = self.store.count(&base).await?;
        let items = if total == 0 {
            Vec::new()
        } else {
            let window = base
                .offset(pagination::offset_for(page, per_page))
                .limit(u64::from(per_page));
            self.store.fetch(&window).await?
        };

        Ok(LengthAwarePage::new(items, total, per_page, page))
    }
}

impl<M, S: ?Sized> Clone for QueryBuilder<'_, M, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            query: self.query.clone(),
            _model: PhantomData,
        }
    }
}

impl<M, S: ?Sized> fmt::Debug for QueryBuilder<'_, M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_equality_clause_matches() {
        let query = Query::new().where_eq("role", "admin");

        assert!(query.matches(&row(json!({"role": "admin"}))));
        assert!(!query.matches(&row(json!({"role": "member"}))));
        assert!(!query.matches(&row(json!({}))));
    }

    #[test]
    fn test_null_clause_matches_missing_and_null() {
        let query = Query::new().where_eq("email", Value::Null);

        assert!(query.matches(&row(json!({}))));
        assert!(query.matches(&row(json!({"email": null}))));
        assert!(!query.matches(&row(json!({"email": "a@b.c"}))));
    }

    #[test]
    fn test_where_all_adds_clause_per_param() {
        let params = row(json!({"active": true, "role": "admin"}));
        let query = Query::new().where_all(&params);

        assert_eq!(query.wheres().len(), 2);
        assert!(query.matches(&row(json!({"active": true, "role": "admin", "name": "x"}))));
        assert!(!query.matches(&row(json!({"active": false, "role": "admin"}))));
    }

    #[test]
    fn test_unbounded_drops_window() {
        let query = Query::new().where_eq("a", 1).limit(5).offset(10);
        let unbounded = query.unbounded();

        assert_eq!(unbounded.wheres(), query.wheres());
        assert_eq!(unbounded.limit_value(), None);
        assert_eq!(unbounded.offset_value(), None);
    }
}
