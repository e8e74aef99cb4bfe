//! End-to-end reconciliation tests over an in-memory store.
//!
//! Each test wires a real table facade, bus, and engine together and
//! drives a sync pass the way an application would.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use syncstore_core::{
    MemoryStore, NotificationBus, Query, Record, RecordId, Table, TableEvent, Timestamp,
    FIELD_UPDATED_AT,
};
use syncstore_engine::SyncEngine;

struct Fixture {
    engine: SyncEngine,
    bus: Arc<NotificationBus>,
}

impl Fixture {
    fn new(table_name: &str) -> Self {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(NotificationBus::new());
        let table = Table::new(table_name, store, Arc::clone(&bus));
        Self {
            engine: SyncEngine::new(table),
            bus,
        }
    }

    fn table(&self) -> &Table {
        self.engine.table()
    }
}

fn stamped(id: &str, millis: i64) -> Record {
    Record::new(id).with_field(FIELD_UPDATED_AT, millis)
}

/// Drains a receiver, keeping only the engine's remote-push events.
fn push_events(rx: &Receiver<TableEvent>) -> Vec<TableEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if !matches!(event, TableEvent::Changed { .. }) {
            events.push(event);
        }
    }
    events
}

#[tokio::test]
async fn new_remote_record_is_added_locally_without_push_event() {
    let fx = Fixture::new("notes");
    let rx = fx.bus.subscribe();

    fx.engine.sync(vec![Record::new("2")]).await.unwrap();

    let stored = fx.table().get_by_id(&RecordId::new("2")).await.unwrap();
    assert!(stored.is_some());
    assert!(push_events(&rx).is_empty());
}

#[tokio::test]
async fn new_local_record_fires_inserted_and_is_not_mutated() {
    let fx = Fixture::new("notes");
    fx.table()
        .add(Record::new("3").with_field("body", "draft"))
        .await
        .unwrap();
    let rx = fx.bus.subscribe();

    fx.engine.sync(vec![]).await.unwrap();

    let events = push_events(&rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        TableEvent::Inserted { table, records } => {
            assert_eq!(table, "notes");
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id().unwrap(), RecordId::new("3"));
        }
        other => panic!("expected Inserted, got {other:?}"),
    }

    // Local store untouched
    let rows = fx.table().get_all(true).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("body"), Some(&serde_json::json!("draft")));
}

#[tokio::test]
async fn newer_remote_wins_and_fires_no_updated_event() {
    let fx = Fixture::new("notes");
    fx.table()
        .add(stamped("1", 1_000).with_field("body", "old"))
        .await
        .unwrap();
    let rx = fx.bus.subscribe();

    fx.engine
        .sync(vec![stamped("1", 2_000).with_field("body", "new")])
        .await
        .unwrap();

    let row = fx
        .table()
        .get_by_id(&RecordId::new("1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.get("body"), Some(&serde_json::json!("new")));
    assert!(push_events(&rx).is_empty());
}

#[tokio::test]
async fn older_remote_fires_updated_with_local_record_and_no_local_write() {
    let fx = Fixture::new("notes");
    fx.table()
        .add(stamped("1", 2_000).with_field("body", "local"))
        .await
        .unwrap();
    let rx = fx.bus.subscribe();

    fx.engine
        .sync(vec![stamped("1", 1_000).with_field("body", "stale")])
        .await
        .unwrap();

    let events = push_events(&rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        TableEvent::Updated { table, records } => {
            assert_eq!(table, "notes");
            assert_eq!(records[0].get("body"), Some(&serde_json::json!("local")));
        }
        other => panic!("expected Updated, got {other:?}"),
    }

    let row = fx
        .table()
        .get_by_id(&RecordId::new("1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.get("body"), Some(&serde_json::json!("local")));
}

#[tokio::test]
async fn second_sync_with_same_snapshot_is_a_noop() {
    let fx = Fixture::new("notes");
    let snapshot = vec![stamped("1", 1_000), Record::new("2")];

    let first = fx.engine.sync(snapshot.clone()).await.unwrap();
    assert_eq!(first.added_locally, 2);

    let rx = fx.bus.subscribe();
    let second = fx.engine.sync(snapshot).await.unwrap();
    assert!(second.is_noop());
    assert!(push_events(&rx).is_empty());
    // Not even a Changed event: no facade mutation ran
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn ids_differing_only_by_separators_are_the_same_record() {
    let fx = Fixture::new("notes");
    fx.table().add(stamped("abc123", 1_000)).await.unwrap();
    let rx = fx.bus.subscribe();

    let report = fx.engine.sync(vec![stamped("abc-123", 1_000)]).await.unwrap();

    assert!(report.is_noop());
    assert!(push_events(&rx).is_empty());
    assert_eq!(fx.table().get_all(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn soft_deleted_rows_are_hidden_but_still_reconciled() {
    let fx = Fixture::new("notes");
    let mut tombstone = stamped("1", 2_000);
    tombstone.mark_deleted(Timestamp(2_000));
    fx.table().add(tombstone).await.unwrap();

    assert!(fx.table().get_all(false).await.unwrap().is_empty());
    assert_eq!(fx.table().get_all(true).await.unwrap().len(), 1);

    // The tombstone matches the remote copy and, being newer, is pushed
    let rx = fx.bus.subscribe();
    fx.engine.sync(vec![stamped("1", 1_000)]).await.unwrap();

    let events = push_events(&rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        TableEvent::Updated { records, .. } => assert!(records[0].is_deleted()),
        other => panic!("expected Updated, got {other:?}"),
    }

    // Absence from the snapshot never deletes: the row is still there
    assert_eq!(fx.table().get_all(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn absence_from_snapshot_never_deletes_local_rows() {
    let fx = Fixture::new("notes");
    fx.table()
        .add_many(vec![Record::new("1"), Record::new("2")])
        .await
        .unwrap();

    fx.engine.sync(vec![Record::new("1")]).await.unwrap();

    assert_eq!(fx.table().get_all(true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn full_pass_applies_all_four_side_effects() {
    let fx = Fixture::new("notes");
    fx.table()
        .add_many(vec![
            stamped("b", 1_000).with_field("body", "stale-local"),
            stamped("c", 9_000).with_field("body", "fresh-local"),
            Record::new("local-only"),
        ])
        .await
        .unwrap();
    let rx = fx.bus.subscribe();

    let report = fx
        .engine
        .sync(vec![
            Record::new("remote-only"),
            stamped("b", 2_000).with_field("body", "fresh-remote"),
            stamped("c", 1_000).with_field("body", "stale-remote"),
        ])
        .await
        .unwrap();

    assert_eq!(report.added_locally, 1);
    assert_eq!(report.updated_locally, 1);
    assert_eq!(report.pushed_inserts, 1);
    assert_eq!(report.pushed_updates, 1);

    // Local table: remote-only added, b overwritten, c kept
    let b = fx
        .table()
        .get_by_id(&RecordId::new("b"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(b.get("body"), Some(&serde_json::json!("fresh-remote")));
    let c = fx
        .table()
        .get_by_id(&RecordId::new("c"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(c.get("body"), Some(&serde_json::json!("fresh-local")));
    assert!(fx
        .table()
        .get_by_id(&RecordId::new("remoteonly"))
        .await
        .unwrap()
        .is_some());

    // Bus: one Inserted with the local-only record, one Updated with c
    let events = push_events(&rx);
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| matches!(
        e,
        TableEvent::Inserted { records, .. }
            if records.len() == 1 && records[0].id().unwrap() == RecordId::new("localonly")
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        TableEvent::Updated { records, .. }
            if records.len() == 1 && records[0].id().unwrap() == RecordId::new("c")
    )));
}

#[tokio::test]
async fn facade_query_paths_work_after_a_sync() {
    let fx = Fixture::new("notes");
    fx.engine
        .sync(vec![
            Record::new("1").with_field("status", "active"),
            Record::new("2").with_field("status", "archived"),
        ])
        .await
        .unwrap();

    let active = fx
        .table()
        .get(&Query::new().field("status", "active"))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    let removed = fx
        .table()
        .remove(&Query::new().field("status", "archived"))
        .await
        .unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(fx.table().get_all(true).await.unwrap().len(), 1);
}
