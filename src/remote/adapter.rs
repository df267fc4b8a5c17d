//! Remote Store Adapter
//!
//! Typed CRUD and subscriptions over the per-user collections
//! `users/{uid}/items` and `users/{uid}/otherCosts`. Records travel as
//! documents whose id and timestamps are owned by the backend.
//!
//! The adapter neither validates nor retries. Every failure surfaces as a
//! [`RemoteOperationError`] carrying the backend's message.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;

use super::subscription::Subscription;
use super::traits::{CollectionPath, Document, DocumentBackend, Fields, RemoteResult};
use crate::domain::{Record, RecordId, RemoteOperationError, Timestamp, User};

pub struct RemoteStoreAdapter {
    backend: Arc<dyn DocumentBackend>,
}

fn to_fields<T: Serialize>(payload: &T) -> RemoteResult<Fields> {
    match serde_json::to_value(payload)? {
        Value::Object(fields) => Ok(fields),
        other => Err(RemoteOperationError::new(format!(
            "invalid-argument: payload must be an object, got {}",
            other
        ))),
    }
}

fn decode<R: Record>(doc: Document) -> RemoteResult<R> {
    let mut data = doc.data;
    data.insert("id".to_string(), Value::String(doc.id));
    data.insert("createdAt".to_string(), serde_json::to_value(doc.created_at)?);
    data.insert("updatedAt".to_string(), serde_json::to_value(doc.updated_at)?);
    Ok(serde_json::from_value(Value::Object(data))?)
}

async fn query_records<R: Record>(backend: &dyn DocumentBackend, collection: &CollectionPath) -> RemoteResult<Vec<R>> {
    backend.query(collection).await?.into_iter().map(decode::<R>).collect()
}

fn report(operation: &'static str, collection: &CollectionPath, err: RemoteOperationError) -> RemoteOperationError {
    tracing::warn!(operation, collection = %collection, error = %err, "remote operation failed");
    err
}

impl RemoteStoreAdapter {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    pub fn collection_for<R: Record>(user: &User) -> CollectionPath {
        CollectionPath::new(user.uid.clone(), R::KIND)
    }

    /// Store a new record; the returned record carries the assigned id and stamps
    pub async fn create<R: Record>(&self, user: &User, draft: &R::Draft) -> RemoteResult<R> {
        let collection = Self::collection_for::<R>(user);
        tracing::debug!(collection = %collection, "create");

        let doc = self
            .backend
            .add(&collection, to_fields(draft)?)
            .await
            .map_err(|e| report("create", &collection, e))?;
        decode(doc)
    }

    /// Merge the present patch fields; returns the stamped updatedAt
    pub async fn update<R: Record>(&self, user: &User, id: &RecordId, patch: &R::Patch) -> RemoteResult<Timestamp> {
        let collection = Self::collection_for::<R>(user);
        tracing::debug!(collection = %collection, id = %id, "update");

        self.backend
            .update(&collection, id.as_str(), to_fields(patch)?)
            .await
            .map_err(|e| report("update", &collection, e))
    }

    pub async fn delete<R: Record>(&self, user: &User, id: &RecordId) -> RemoteResult<()> {
        let collection = Self::collection_for::<R>(user);
        tracing::debug!(collection = %collection, id = %id, "delete");

        self.backend
            .delete(&collection, id.as_str())
            .await
            .map_err(|e| report("delete", &collection, e))
    }

    /// All records of the user's collection, newest first
    pub async fn list<R: Record>(&self, user: &User) -> RemoteResult<Vec<R>> {
        let collection = Self::collection_for::<R>(user);
        tracing::debug!(collection = %collection, "list");

        query_records(self.backend.as_ref(), &collection)
            .await
            .map_err(|e| report("list", &collection, e))
    }

    /// Deliver the full ordered list now and after every change to the collection
    pub async fn subscribe<R, F>(&self, user: &User, callback: F) -> RemoteResult<Subscription>
    where
        R: Record,
        F: Fn(Vec<R>) + Send + Sync + 'static,
    {
        let collection = Self::collection_for::<R>(user);

        // Listen before the first query so no write falls in between.
        let mut feed = self.backend.changes();
        let initial = query_records::<R>(self.backend.as_ref(), &collection)
            .await
            .map_err(|e| report("subscribe", &collection, e))?;
        callback(initial);

        let backend = Arc::clone(&self.backend);
        let watched = collection.clone();
        let task = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(changed) if changed != watched => continue,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
                match query_records::<R>(backend.as_ref(), &watched).await {
                    Ok(records) => callback(records),
                    Err(e) => tracing::warn!(collection = %watched, error = %e, "snapshot refresh failed"),
                }
            }
        });

        tracing::debug!(collection = %collection, "subscribed");
        Ok(Subscription::new(collection, task))
    }
}
