//! The CRUD table facade.

use crate::bus::{NotificationBus, TableEvent};
use crate::error::CoreResult;
use crate::id::RecordId;
use crate::query::Query;
use crate::record::Record;
use crate::store::{TableHandle, TableStore};
use std::sync::Arc;
use tracing::trace;

/// A facade over a named table in the persistent store.
///
/// Every operation delegates to the store, resolving the collection
/// handle per call. Mutating operations publish a generic
/// [`TableEvent::Changed`] on the notification bus after the store call
/// succeeds, for coarse observers such as UI refresh.
///
/// Tables are explicit per-name objects constructed with
/// [`Table::new`]; there is no shared module-level state. Cloning a
/// `Table` yields another facade over the same table.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use syncstore_core::{MemoryStore, NotificationBus, Record, Table};
///
/// let store = Arc::new(MemoryStore::new());
/// let bus = Arc::new(NotificationBus::new());
/// let users = Table::new("users", store, bus);
///
/// let id = users.add(Record::new("u-1").with_field("name", "alice")).await?;
/// let found = users.get_by_id(&id).await?;
/// ```
#[derive(Clone)]
pub struct Table {
    name: String,
    store: Arc<dyn TableStore>,
    bus: Arc<NotificationBus>,
}

impl Table {
    /// Creates a facade over the named table.
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn TableStore>,
        bus: Arc<NotificationBus>,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            bus,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the notification bus this table publishes on.
    #[must_use]
    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// Resolves the store handle for this table.
    async fn handle(&self) -> CoreResult<Arc<dyn TableHandle>> {
        self.store.table(&self.name).await
    }

    /// Publishes the generic table-changed event.
    fn notify_changed(&self) {
        trace!(table = %self.name, "table changed");
        self.bus.publish(TableEvent::Changed {
            table: self.name.clone(),
        });
    }

    /// Returns the records matching a field-equality query.
    pub async fn get(&self, query: &Query) -> CoreResult<Vec<Record>> {
        self.handle().await?.find(query).await
    }

    /// Returns the record with the given id, if present.
    pub async fn get_by_id(&self, id: &RecordId) -> CoreResult<Option<Record>> {
        self.handle().await?.get(id).await
    }

    /// Returns all records of the table.
    ///
    /// When `include_removed` is false, records carrying a `deletedAt`
    /// field are excluded. Reconciliation always reads with
    /// `include_removed = true` so soft-deleted rows still participate
    /// in matching.
    pub async fn get_all(&self, include_removed: bool) -> CoreResult<Vec<Record>> {
        let mut rows = self.handle().await?.rows().await?;
        if !include_removed {
            rows.retain(|r| !r.is_deleted());
        }
        Ok(rows)
    }

    /// Adds a record, returning its (possibly generated) id.
    pub async fn add(&self, record: Record) -> CoreResult<RecordId> {
        let id = self.handle().await?.add(record).await?;
        self.notify_changed();
        Ok(id)
    }

    /// Adds a batch of records, returning them as stored.
    pub async fn add_many(&self, records: Vec<Record>) -> CoreResult<Vec<Record>> {
        let added = self.handle().await?.add_many(records).await?;
        self.notify_changed();
        Ok(added)
    }

    /// Patches every record matching the query, returning the affected
    /// records.
    pub async fn update(&self, query: &Query, patch: &Record) -> CoreResult<Vec<Record>> {
        let affected = self.handle().await?.update(query, patch).await?;
        self.notify_changed();
        Ok(affected)
    }

    /// Patches the record with the given id, returning it.
    pub async fn update_by_id(&self, id: &RecordId, patch: &Record) -> CoreResult<Record> {
        let updated = self.handle().await?.update_by_id(id, patch).await?;
        self.notify_changed();
        Ok(updated)
    }

    /// Patches a batch of records, matched by each record's own id.
    pub async fn update_many(&self, records: Vec<Record>) -> CoreResult<Vec<Record>> {
        let updated = self.handle().await?.update_many(records).await?;
        self.notify_changed();
        Ok(updated)
    }

    /// Removes every record matching the query, returning the removed
    /// records.
    pub async fn remove(&self, query: &Query) -> CoreResult<Vec<Record>> {
        let removed = self.handle().await?.remove(query).await?;
        self.notify_changed();
        Ok(removed)
    }

    /// Removes the record with the given id, returning it.
    pub async fn remove_by_id(&self, id: &RecordId) -> CoreResult<Record> {
        let removed = self.handle().await?.remove_by_id(id).await?;
        self.notify_changed();
        Ok(removed)
    }

    /// Drops all records of the table, returning them.
    pub async fn erase(&self) -> CoreResult<Vec<Record>> {
        let removed = self.handle().await?.clear().await?;
        self.notify_changed();
        Ok(removed)
    }
}
