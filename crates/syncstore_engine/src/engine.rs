//! The reconciliation driver.

use crate::error::SyncResult;
use crate::reconcile;
use syncstore_core::{Record, Table, TableEvent};
use tokio::sync::Mutex;
use tracing::debug;

/// Summary of one reconciliation pass.
///
/// Informational only: completion of a sync is defined by its side
/// effects on the table and the bus, not by this value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Remote records added to the local table.
    pub added_locally: usize,
    /// Local records overwritten with newer remote versions.
    pub updated_locally: usize,
    /// Local records announced for a remote-side insert.
    pub pushed_inserts: usize,
    /// Local records announced for a remote-side update.
    pub pushed_updates: usize,
}

impl SyncReport {
    /// Returns true if the pass had no side effects at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added_locally == 0
            && self.updated_locally == 0
            && self.pushed_inserts == 0
            && self.pushed_updates == 0
    }
}

/// Merges remote snapshots into one local table.
///
/// The engine owns a per-table lock so that only one reconciliation is
/// in flight per table at a time; concurrent `sync` calls queue up.
/// Local side effects go through the table facade, remote-directed ones
/// are published on the table's notification bus — the engine itself
/// never talks to the network.
///
/// # Example
///
/// ```rust,ignore
/// use syncstore_engine::SyncEngine;
///
/// let engine = SyncEngine::new(table);
/// let report = engine.sync(remote_snapshot).await?;
/// if report.is_noop() {
///     // both sides already agreed
/// }
/// ```
pub struct SyncEngine {
    table: Table,
    /// Serializes reconciliation passes on this table.
    in_flight: Mutex<()>,
}

impl SyncEngine {
    /// Creates an engine over the given table facade.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self {
            table,
            in_flight: Mutex::new(()),
        }
    }

    /// Returns the table this engine reconciles.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Merges a remote snapshot into the local table.
    ///
    /// Reads the full local table once (soft-deleted rows included),
    /// classifies every record, then applies the four independent side
    /// effects: local batch-add, local batch-update, and `Inserted` /
    /// `Updated` events for records the remote side needs.
    ///
    /// The snapshot is consumed; it is never persisted as such.
    ///
    /// # Errors
    ///
    /// Propagates facade/store failures from the side-effect writes.
    /// Malformed records in the snapshot are skipped, not errors.
    pub async fn sync(&self, mut remote: Vec<Record>) -> SyncResult<SyncReport> {
        let _guard = self.in_flight.lock().await;

        for record in &mut remote {
            record.normalize_id();
        }

        // The one local read of the pass; everything below works
        // against this snapshot.
        let mut local = self.table.get_all(true).await?;
        for record in &mut local {
            record.normalize_id();
        }

        let diff = reconcile::classify(&remote, &local);
        let report = SyncReport {
            added_locally: diff.items_to_add.len(),
            updated_locally: diff.local_updates.len(),
            pushed_inserts: diff.items_to_add_remote.len(),
            pushed_updates: diff.remote_updates.len(),
        };

        if !diff.items_to_add.is_empty() {
            let added = self.table.add_many(diff.items_to_add).await?;
            debug!(
                table = %self.table.name(),
                count = added.len(),
                "added remote records to local table"
            );
        }

        if !diff.items_to_add_remote.is_empty() {
            debug!(
                table = %self.table.name(),
                count = diff.items_to_add_remote.len(),
                "announcing local records for remote insert"
            );
            self.table.bus().publish(TableEvent::Inserted {
                table: self.table.name().to_owned(),
                records: diff.items_to_add_remote,
            });
        }

        if !diff.local_updates.is_empty() {
            let updated = self.table.update_many(diff.local_updates).await?;
            debug!(
                table = %self.table.name(),
                count = updated.len(),
                "applied newer remote records to local table"
            );
        }

        if !diff.remote_updates.is_empty() {
            debug!(
                table = %self.table.name(),
                count = diff.remote_updates.len(),
                "announcing newer local records for remote update"
            );
            self.table.bus().publish(TableEvent::Updated {
                table: self.table.name().to_owned(),
                records: diff.remote_updates,
            });
        }

        Ok(report)
    }
}
