//! Field-equality query predicates.

use crate::record::Record;
use serde_json::{Map, Value};

/// A query matching records by field equality.
///
/// A record matches when every condition field is present on the record
/// with an equal value. The empty query matches every record.
///
/// # Example
///
/// ```
/// use syncstore_core::{Query, Record};
///
/// let query = Query::new().field("status", "active");
/// let record = Record::new("1").with_field("status", "active");
/// assert!(query.matches(&record));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Map<String, Value>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition (builder style).
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(name.into(), value.into());
        self
    }

    /// Returns true if the record satisfies every condition.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(name, value)| record.get(name) == Some(value))
    }

    /// Returns true if the query has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
