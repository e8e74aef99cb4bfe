//! # SyncStore Engine
//!
//! Two-way reconciliation for SyncStore tables.
//!
//! Given a remotely-fetched snapshot of a table, the engine merges it
//! into the local table: remote-only records are added locally, newer
//! remote records overwrite local ones, and records the remote side is
//! missing or holds stale copies of are announced on the notification
//! bus for a remote-side consumer to push upstream.
//!
//! ## Architecture
//!
//! The engine performs no network I/O. Conflicts that require pushing
//! data *outward* are only ever announced via [`TableEvent::Inserted`]
//! and [`TableEvent::Updated`] events, keeping the core
//! transport-agnostic and testable without a network dependency.
//!
//! ## Key invariants
//!
//! - One local read per sync; the whole pass works against that snapshot
//! - One reconciliation in flight per table at a time
//! - Merge-don't-destroy: local records are never deleted because they
//!   are absent from the remote snapshot; deletion is expressed only by
//!   the `deletedAt` soft-delete marker
//!
//! [`TableEvent::Inserted`]: syncstore_core::TableEvent::Inserted
//! [`TableEvent::Updated`]: syncstore_core::TableEvent::Updated

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod reconcile;

pub use engine::{SyncEngine, SyncReport};
pub use error::{SyncError, SyncResult};
pub use reconcile::{classify, Diff};
