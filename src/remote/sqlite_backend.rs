//! SQLite Document Backend
//!
//! Local stand-in for the hosted document store. Documents are JSON blobs
//! keyed by `(collection path, id)`; every write is announced on a
//! broadcast change feed.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::db::Database;
use super::traits::{CollectionPath, Document, DocumentBackend, Fields, RemoteResult};
use crate::domain::{RemoteOperationError, Timestamp};

const CHANGE_FEED_CAPACITY: usize = 64;

/// SQLite implementation of the document store
pub struct SqliteBackend {
    db: Database,
    changes: broadcast::Sender<CollectionPath>,
    last_stamp: AtomicI64,
}

impl SqliteBackend {
    pub async fn open(db: Database) -> RemoteResult<Self> {
        let last_stamp = {
            let conn = db.connection().await;
            conn.query_row("SELECT COALESCE(MAX(updated_at), 0) FROM documents", [], |row| {
                row.get::<_, i64>(0)
            })?
        };
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        Ok(Self {
            db,
            changes,
            last_stamp: AtomicI64::new(last_stamp),
        })
    }

    /// Server clock in milliseconds, never behind a previously issued stamp
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self.last_stamp.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }

    fn publish(&self, collection: &CollectionPath) {
        // No receivers is fine: nobody is listening.
        let _ = self.changes.send(collection.clone());
    }
}

fn to_timestamp(millis: i64) -> RemoteResult<Timestamp> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| RemoteOperationError::new(format!("data-loss: invalid timestamp {}", millis)))
}

fn query_documents(conn: &Connection, collection: &str) -> RemoteResult<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT id, data, created_at, updated_at FROM documents
         WHERE collection = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![collection], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut documents = Vec::new();
    for row in rows {
        let (id, data, created_at, updated_at) = row?;
        documents.push(Document {
            id,
            data: serde_json::from_str(&data)?,
            created_at: to_timestamp(created_at)?,
            updated_at: to_timestamp(updated_at)?,
        });
    }
    Ok(documents)
}

#[async_trait]
impl DocumentBackend for SqliteBackend {
    async fn add(&self, collection: &CollectionPath, data: Fields) -> RemoteResult<Document> {
        let id = Uuid::new_v4().simple().to_string();
        let body = serde_json::to_string(&data)?;

        let stamp = {
            let conn = self.db.connection().await;
            let stamp = self.next_stamp();
            conn.execute(
                "INSERT INTO documents (collection, id, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![collection.to_string(), id, body, stamp],
            )?;
            stamp
        };
        self.publish(collection);

        let at = to_timestamp(stamp)?;
        Ok(Document {
            id,
            data,
            created_at: at,
            updated_at: at,
        })
    }

    async fn update(&self, collection: &CollectionPath, id: &str, fields: Fields) -> RemoteResult<Timestamp> {
        let patch = serde_json::to_string(&fields)?;

        let stamp = {
            let conn = self.db.connection().await;
            let stamp = self.next_stamp();
            let changed = conn.execute(
                "UPDATE documents SET data = json_patch(data, ?1), updated_at = ?2
                 WHERE collection = ?3 AND id = ?4",
                params![patch, stamp, collection.to_string(), id],
            )?;
            if changed == 0 {
                return Err(RemoteOperationError::not_found(format!(
                    "No document to update: {}",
                    collection.document(id)
                )));
            }
            stamp
        };
        self.publish(collection);

        to_timestamp(stamp)
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> RemoteResult<()> {
        let removed = {
            let conn = self.db.connection().await;
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.to_string(), id],
            )?
        };
        if removed > 0 {
            self.publish(collection);
        }
        Ok(())
    }

    async fn query(&self, collection: &CollectionPath) -> RemoteResult<Vec<Document>> {
        let conn = self.db.connection().await;
        query_documents(&conn, &collection.to_string())
    }

    fn changes(&self) -> broadcast::Receiver<CollectionPath> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordKind;
    use crate::remote::init_db;
    use serde_json::json;
    use std::path::Path;

    async fn setup_backend() -> SqliteBackend {
        let db = init_db(Path::new(":memory:")).await.expect("Failed to init test DB");
        SqliteBackend::open(db).await.expect("Failed to open backend")
    }

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_add_stamps_both_timestamps() {
        let backend = setup_backend().await;
        let items = CollectionPath::new("u1", RecordKind::Item);

        let doc = backend.add(&items, fields(json!({ "name": "Desk" }))).await.unwrap();

        assert!(!doc.id.is_empty());
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[tokio::test]
    async fn test_stamps_never_go_backwards() {
        let backend = setup_backend().await;
        let items = CollectionPath::new("u1", RecordKind::Item);

        let mut previous = None;
        for n in 0..20 {
            let doc = backend.add(&items, fields(json!({ "n": n }))).await.unwrap();
            if let Some(prev) = previous {
                assert!(doc.created_at >= prev);
            }
            previous = Some(doc.created_at);
        }
    }

    #[tokio::test]
    async fn test_query_orders_newest_first() {
        let backend = setup_backend().await;
        let items = CollectionPath::new("u1", RecordKind::Item);

        let first = backend.add(&items, fields(json!({ "n": 1 }))).await.unwrap();
        let second = backend.add(&items, fields(json!({ "n": 2 }))).await.unwrap();
        let third = backend.add(&items, fields(json!({ "n": 3 }))).await.unwrap();

        let ids: Vec<String> = backend.query(&items).await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let backend = setup_backend().await;
        let items = CollectionPath::new("u1", RecordKind::Item);
        let doc = backend.add(&items, fields(json!({ "name": "Desk", "cost": "100" }))).await.unwrap();

        let stamped = backend.update(&items, &doc.id, fields(json!({ "cost": "50" }))).await.unwrap();

        let stored = backend.query(&items).await.unwrap().remove(0);
        assert_eq!(stored.data.get("name"), Some(&json!("Desk")));
        assert_eq!(stored.data.get("cost"), Some(&json!("50")));
        assert_eq!(stored.updated_at, stamped);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let backend = setup_backend().await;
        let items = CollectionPath::new("u1", RecordKind::Item);

        let err = backend.update(&items, "missing", Fields::new()).await.unwrap_err();
        assert!(err.message().starts_with("not-found"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = setup_backend().await;
        let items = CollectionPath::new("u1", RecordKind::Item);
        let doc = backend.add(&items, fields(json!({ "name": "Desk" }))).await.unwrap();

        backend.delete(&items, &doc.id).await.unwrap();
        backend.delete(&items, &doc.id).await.unwrap();
        backend.delete(&items, "never-existed").await.unwrap();

        assert!(backend.query(&items).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let backend = setup_backend().await;
        let mine = CollectionPath::new("u1", RecordKind::Item);
        let theirs = CollectionPath::new("u2", RecordKind::Item);
        let my_costs = CollectionPath::new("u1", RecordKind::OtherCost);

        backend.add(&mine, fields(json!({ "name": "Desk" }))).await.unwrap();

        assert_eq!(backend.query(&mine).await.unwrap().len(), 1);
        assert!(backend.query(&theirs).await.unwrap().is_empty());
        assert!(backend.query(&my_costs).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_are_announced() {
        let backend = setup_backend().await;
        let items = CollectionPath::new("u1", RecordKind::Item);
        let mut feed = backend.changes();

        backend.add(&items, fields(json!({ "name": "Desk" }))).await.unwrap();

        assert_eq!(feed.recv().await.unwrap(), items);
    }
}
