//! Remote Layer - Core Traits
//!
//! Abstract interfaces of the hosted backend: a per-user document store
//! with a change feed, and an authentication service.
//! Implementations can use SQLite, a network client, a test double, etc.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::domain::{AuthError, RecordKind, RemoteOperationError, Timestamp, User};

/// Result type of every remote store call
pub type RemoteResult<T> = Result<T, RemoteOperationError>;

/// Document body without id and timestamps
pub type Fields = Map<String, Value>;

/// `users/{uid}/{collection}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    uid: String,
    kind: RecordKind,
}

impl CollectionPath {
    pub fn new(uid: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            uid: uid.into(),
            kind,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Path of one document in this collection
    pub fn document(&self, id: &str) -> String {
        format!("{}/{}", self, id)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "users/{}/{}", self.uid, self.kind.collection())
    }
}

/// A stored document as returned by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Hosted document store client
///
/// The backend does not validate payloads; callers do.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Store a new document; id, createdAt and updatedAt are assigned here
    async fn add(&self, collection: &CollectionPath, data: Fields) -> RemoteResult<Document>;

    /// Merge `fields` into an existing document and stamp a fresh updatedAt
    async fn update(&self, collection: &CollectionPath, id: &str, fields: Fields) -> RemoteResult<Timestamp>;

    /// Remove a document
    async fn delete(&self, collection: &CollectionPath, id: &str) -> RemoteResult<()>;

    /// All documents of a collection, createdAt descending
    async fn query(&self, collection: &CollectionPath) -> RemoteResult<Vec<Document>>;

    /// Feed of collections changed by writes
    fn changes(&self) -> broadcast::Receiver<CollectionPath>;
}

/// Hosted authentication client
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Session persisted from a previous run, if any
    async fn current_user(&self) -> Result<Option<User>, AuthError>;
}
