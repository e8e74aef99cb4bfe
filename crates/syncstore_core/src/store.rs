//! The persistent table store boundary.
//!
//! The durable keyed storage backing each named table is an external
//! collaborator; this module specifies its contract and provides an
//! in-memory implementation for tests and ephemeral tables.

use crate::error::{CoreError, CoreResult};
use crate::id::RecordId;
use crate::query::Query;
use crate::record::{Record, FIELD_ID};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A store of named tables.
///
/// `table` resolves a collection handle for a named table, creating the
/// table if the backend supports it. Every facade operation resolves
/// its handle per call; handles are cheap to obtain.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Resolves the handle for a named table.
    async fn table(&self, name: &str) -> CoreResult<Arc<dyn TableHandle>>;
}

/// Operations on a single table's rows.
///
/// Rows are keyed by normalized record id; within a table, normalized
/// ids are unique. Update operations use patch-merge semantics: fields
/// present in the patch replace current values, other fields are kept.
#[async_trait]
pub trait TableHandle: Send + Sync {
    /// Returns the rows matching a field-equality query.
    async fn find(&self, query: &Query) -> CoreResult<Vec<Record>>;

    /// Returns the row with the given id, if present.
    async fn get(&self, id: &RecordId) -> CoreResult<Option<Record>>;

    /// Adds a row, generating an id when the record carries none.
    ///
    /// Returns the (possibly generated) normalized id.
    async fn add(&self, record: Record) -> CoreResult<RecordId>;

    /// Adds a batch of rows, returning them as stored.
    async fn add_many(&self, records: Vec<Record>) -> CoreResult<Vec<Record>>;

    /// Patches every row matching the query, returning the affected rows.
    async fn update(&self, query: &Query, patch: &Record) -> CoreResult<Vec<Record>>;

    /// Patches the row with the given id, returning it.
    async fn update_by_id(&self, id: &RecordId, patch: &Record) -> CoreResult<Record>;

    /// Patches a batch of rows, matched by each record's own id.
    async fn update_many(&self, records: Vec<Record>) -> CoreResult<Vec<Record>>;

    /// Removes every row matching the query, returning the removed rows.
    async fn remove(&self, query: &Query) -> CoreResult<Vec<Record>>;

    /// Removes the row with the given id, returning it.
    async fn remove_by_id(&self, id: &RecordId) -> CoreResult<Record>;

    /// Drops all rows, returning them.
    async fn clear(&self) -> CoreResult<Vec<Record>>;

    /// Returns a raw snapshot of all rows, soft-deleted ones included,
    /// in insertion order.
    async fn rows(&self) -> CoreResult<Vec<Record>>;
}

/// An in-memory table store.
///
/// Tables are created on first access. Suitable for unit tests,
/// integration tests, and ephemeral databases that don't need
/// persistence. Thread-safe.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Arc<MemoryTable>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn table(&self, name: &str) -> CoreResult<Arc<dyn TableHandle>> {
        let mut tables = self.tables.write();
        let table = tables
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(MemoryTable::default()));
        Ok(Arc::clone(table) as Arc<dyn TableHandle>)
    }
}

/// Rows of a single in-memory table, in insertion order.
#[derive(Default)]
struct MemoryTable {
    rows: RwLock<Vec<Record>>,
}

impl MemoryTable {
    /// Inserts one record under the rows lock, generating an id when
    /// absent and enforcing id uniqueness.
    fn insert_row(rows: &mut Vec<Record>, mut record: Record) -> CoreResult<Record> {
        let id = match record.get(FIELD_ID) {
            Some(_) => record.id()?,
            None => {
                let id = RecordId::random();
                record.set(FIELD_ID, id.as_str());
                id
            }
        };

        for existing in rows.iter() {
            if existing.id().ok().as_ref() == Some(&id) {
                return Err(CoreError::duplicate_id(id.as_str()));
            }
        }

        rows.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl TableHandle for MemoryTable {
    async fn find(&self, query: &Query) -> CoreResult<Vec<Record>> {
        let rows = self.rows.read();
        Ok(rows.iter().filter(|r| query.matches(r)).cloned().collect())
    }

    async fn get(&self, id: &RecordId) -> CoreResult<Option<Record>> {
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .find(|r| r.id().ok().as_ref() == Some(id))
            .cloned())
    }

    async fn add(&self, record: Record) -> CoreResult<RecordId> {
        let mut rows = self.rows.write();
        let stored = Self::insert_row(&mut rows, record)?;
        stored.id()
    }

    async fn add_many(&self, records: Vec<Record>) -> CoreResult<Vec<Record>> {
        let mut rows = self.rows.write();
        let mut added = Vec::with_capacity(records.len());
        for record in records {
            added.push(Self::insert_row(&mut rows, record)?);
        }
        Ok(added)
    }

    async fn update(&self, query: &Query, patch: &Record) -> CoreResult<Vec<Record>> {
        let mut rows = self.rows.write();
        let mut affected = Vec::new();
        for row in rows.iter_mut() {
            if query.matches(row) {
                row.apply_patch(patch);
                affected.push(row.clone());
            }
        }
        Ok(affected)
    }

    async fn update_by_id(&self, id: &RecordId, patch: &Record) -> CoreResult<Record> {
        let mut rows = self.rows.write();
        for row in rows.iter_mut() {
            if row.id().ok().as_ref() == Some(id) {
                row.apply_patch(patch);
                return Ok(row.clone());
            }
        }
        Err(CoreError::record_not_found(id.as_str()))
    }

    async fn update_many(&self, records: Vec<Record>) -> CoreResult<Vec<Record>> {
        let mut rows = self.rows.write();
        let mut updated = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id()?;
            let row = rows
                .iter_mut()
                .find(|r| r.id().ok().as_ref() == Some(&id))
                .ok_or_else(|| CoreError::record_not_found(id.as_str()))?;
            row.apply_patch(&record);
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn remove(&self, query: &Query) -> CoreResult<Vec<Record>> {
        let mut rows = self.rows.write();
        let mut removed = Vec::new();
        rows.retain(|row| {
            if query.matches(row) {
                removed.push(row.clone());
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn remove_by_id(&self, id: &RecordId) -> CoreResult<Record> {
        let mut rows = self.rows.write();
        let position = rows
            .iter()
            .position(|r| r.id().ok().as_ref() == Some(id))
            .ok_or_else(|| CoreError::record_not_found(id.as_str()))?;
        Ok(rows.remove(position))
    }

    async fn clear(&self) -> CoreResult<Vec<Record>> {
        let mut rows = self.rows.write();
        Ok(std::mem::take(&mut *rows))
    }

    async fn rows(&self) -> CoreResult<Vec<Record>> {
        Ok(self.rows.read().clone())
    }
}
