//! Length-aware pagination

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::PersistenceError;
use crate::model::Model;

/// Resolves the requested page size against the model default
pub fn resolve_per_page<M: Model>(per_page: Option<u32>) -> Result<u32, PersistenceError> {
    match per_page {
        None => Ok(M::PER_PAGE.max(1)),
        Some(0) => Err(PersistenceError::invalid_query("per-page must be at least 1")),
        Some(n) => Ok(n),
    }
}

/// Number of records preceding `page`
pub fn offset_for(page: u32, per_page: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(per_page)
}

/// One page of results plus the metadata needed to render the rest
///
/// Serialises as `{data, total, per_page, current_page, last_page, from, to}`.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthAwarePage<M> {
    items: Vec<M>,
    total: u64,
    per_page: u32,
    current_page: u32,
    last_page: u32,
}

impl<M> LengthAwarePage<M> {
    /// Creates a page; `per_page` and `current_page` are clamped to at least 1
    pub fn new(items: Vec<M>, total: u64, per_page: u32, current_page: u32) -> Self {
        let per_page = per_page.max(1);
        let pages = total.div_ceil(u64::from(per_page)).max(1);
        Self {
            items,
            total,
            per_page,
            current_page: current_page.max(1),
            last_page: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }

    pub fn items(&self) -> &[M] {
        &self.items
    }

    pub fn into_items(self) -> Vec<M> {
        self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based position of the first item on this page
    pub fn from(&self) -> Option<u64> {
        if self.items.is_empty() {
            None
        } else {
            Some(offset_for(self.current_page, self.per_page) + 1)
        }
    }

    /// 1-based position of the last item on this page
    pub fn to(&self) -> Option<u64> {
        self.from().map(|first| first + self.items.len() as u64 - 1)
    }

    pub fn on_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }
}

impl<M: Serialize> Serialize for LengthAwarePage<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LengthAwarePage", 7)?;
        state.serialize_field("data", &self.items)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("per_page", &self.per_page)?;
        state.serialize_field("current_page", &self.current_page)?;
        state.serialize_field("last_page", &self.last_page)?;
        state.serialize_field("from", &self.from())?;
        state.serialize_field("to", &self.to())?;
        state.end()
    }
}
