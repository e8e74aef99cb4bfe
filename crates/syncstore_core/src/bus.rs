//! Notification bus for table change events.
//!
//! The bus is an in-process publish/subscribe channel. The table facade
//! publishes a generic [`TableEvent::Changed`] after every mutation; the
//! reconciliation engine publishes [`TableEvent::Inserted`] and
//! [`TableEvent::Updated`] for records that need a remote-side push,
//! since the core has no outbound network capability of its own.
//!
//! Delivery is best-effort: events published while no subscriber is
//! registered are dropped, and there is no replay or buffering beyond
//! the channel itself.
//!
//! # Usage
//!
//! ```rust,ignore
//! use syncstore_core::{NotificationBus, TableEvent};
//!
//! let bus = Arc::new(NotificationBus::new());
//! let rx = bus.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(event) = rx.recv() {
//!         println!("table event: {:?}", event);
//!     }
//! });
//! ```

use crate::record::Record;
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// An event published on the notification bus.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// A table was mutated through the facade. Carries no detail; it is
    /// intended for coarse observers such as UI refresh.
    Changed {
        /// Name of the table that changed.
        table: String,
    },
    /// Local records that do not exist remotely and should be pushed
    /// upstream by a remote-side consumer.
    Inserted {
        /// Name of the table the records belong to.
        table: String,
        /// The records the remote side does not know about.
        records: Vec<Record>,
    },
    /// Local records that are newer than their remote counterparts and
    /// should be pushed upstream by a remote-side consumer.
    Updated {
        /// Name of the table the records belong to.
        table: String,
        /// The newer local records.
        records: Vec<Record>,
    },
}

impl TableEvent {
    /// Returns the name of the table the event concerns.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Changed { table }
            | Self::Inserted { table, .. }
            | Self::Updated { table, .. } => table,
        }
    }
}

/// An in-process publish/subscribe channel for [`TableEvent`]s.
///
/// One instance is shared by every table and engine that needs it; it is
/// constructed explicitly and passed around rather than living in global
/// state. Thread-safe.
pub struct NotificationBus {
    subscribers: RwLock<Vec<Sender<TableEvent>>>,
}

impl NotificationBus {
    /// Creates a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribes to the bus.
    ///
    /// Returns a receiver that will receive all events published after
    /// this call. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<TableEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Disconnected subscribers are pruned. Publishing with no
    /// subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: TableEvent) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
