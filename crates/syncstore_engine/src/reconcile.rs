//! Diff classification over two keyed record collections.
//!
//! [`classify`] is the heart of the engine: a pure in-memory diff of a
//! remote snapshot against the local table contents, with
//! timestamp-based conflict resolution. It performs no I/O, which keeps
//! the merge logic testable in isolation; applying the resulting
//! [`Diff`] is the job of [`SyncEngine`](crate::SyncEngine).

use std::collections::HashSet;
use syncstore_core::{Record, RecordId, TimestampField};
use tracing::warn;

/// The classification of every record from one reconciliation pass.
///
/// Ephemeral: computed per call and discarded once its side effects
/// have been issued. Records not in any set are unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    /// Remote records absent locally; to be added to the local table.
    pub items_to_add: Vec<Record>,
    /// Local records absent remotely; to be announced for remote push.
    pub items_to_add_remote: Vec<Record>,
    /// Remote records newer than their local counterparts; to be
    /// applied to the local table.
    pub local_updates: Vec<Record>,
    /// Local records newer than their remote counterparts; to be
    /// announced for remote push.
    pub remote_updates: Vec<Record>,
}

impl Diff {
    /// Returns true if the pass classified nothing, i.e. both sides
    /// already agree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items_to_add.is_empty()
            && self.items_to_add_remote.is_empty()
            && self.local_updates.is_empty()
            && self.remote_updates.is_empty()
    }
}

/// Classifies every record of a remote snapshot against the local
/// table contents.
///
/// Matching is by normalized id. For matched pairs, `updatedAt` decides
/// the direction of the update:
///
/// - remote newer → [`Diff::local_updates`]
/// - local newer → [`Diff::remote_updates`]
/// - equal, or the remote record carries no `updatedAt`, or exactly one
///   side carries one → unchanged
///
/// Records with a malformed `updatedAt` on either side, and records
/// without a usable string id, are skipped with a warning; a bad record
/// never aborts the pass.
///
/// Local records never land in `items_to_add`-style deletion: absence
/// from the remote snapshot means the remote side does not know the
/// record yet, not that it was deleted remotely.
#[must_use]
pub fn classify(remote: &[Record], local: &[Record]) -> Diff {
    let mut diff = Diff::default();

    // Working copy of the local table; matched rows are consumed.
    let mut working: Vec<(RecordId, Record)> = local
        .iter()
        .filter_map(|record| match record.id() {
            Ok(id) => Some((id, record.clone())),
            Err(err) => {
                warn!(%err, "skipping local record without usable id");
                None
            }
        })
        .collect();

    let remote_ids: HashSet<RecordId> = remote
        .iter()
        .filter_map(|record| record.id().ok())
        .collect();

    for record in remote {
        let id = match record.id() {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "skipping remote record without usable id");
                continue;
            }
        };

        let Some(index) = working.iter().position(|(local_id, _)| *local_id == id) else {
            diff.items_to_add.push(record.clone());
            continue;
        };

        // Matched and consumed, whatever the timestamp outcome.
        let (_, local_record) = working.remove(index);

        match (record.updated_at(), local_record.updated_at()) {
            // The comparison is only entered when the remote record
            // carries the field.
            (TimestampField::Missing, _) => {}
            (TimestampField::Invalid, _) | (_, TimestampField::Invalid) => {
                warn!(id = %id, "skipping conflict check: malformed updatedAt");
            }
            // One-sided timestamp: no timestamp-based conflict.
            (TimestampField::At(_), TimestampField::Missing) => {}
            (TimestampField::At(remote_at), TimestampField::At(local_at)) => {
                if local_at < remote_at {
                    diff.local_updates.push(record.clone());
                } else if local_at > remote_at {
                    diff.remote_updates.push(local_record);
                }
            }
        }
    }

    // Whatever remains was never matched; anything whose id the remote
    // snapshot does not contain is a candidate for a remote-side add.
    for (id, record) in working {
        if !remote_ids.contains(&id) {
            diff.items_to_add_remote.push(record);
        }
    }

    diff
}
