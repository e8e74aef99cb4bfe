//! # SyncStore Core
//!
//! Record model, storage boundary, and table facade for SyncStore.
//!
//! This crate provides:
//! - Dynamic field-map records with interpreted `id`, `updatedAt`, and
//!   `deletedAt` fields
//! - Identifier normalization so differently-formatted ids compare equal
//! - Field-equality query predicates
//! - The [`TableStore`]/[`TableHandle`] storage boundary with an in-memory
//!   implementation for tests and ephemeral tables
//! - The [`Table`] CRUD facade over a named table
//! - The [`NotificationBus`] for typed table-change events
//!
//! The reconciliation engine that merges remote snapshots into a local
//! table lives in the `syncstore_engine` crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bus;
mod error;
mod id;
mod query;
mod record;
mod store;
mod table;

pub use bus::{NotificationBus, TableEvent};
pub use error::{CoreError, CoreResult};
pub use id::RecordId;
pub use query::Query;
pub use record::{Record, Timestamp, TimestampField, FIELD_DELETED_AT, FIELD_ID, FIELD_UPDATED_AT};
pub use store::{MemoryStore, TableHandle, TableStore};
pub use table::Table;
