//! Remote Layer
//!
//! Boundary to the hosted backend: document store, authentication, and the
//! typed adapter the repositories talk to.

mod adapter;
mod auth;
mod db;
mod sqlite_backend;
mod subscription;
mod traits;

pub use adapter::RemoteStoreAdapter;
pub use auth::LocalAuthService;
pub use db::{init_db, Database};
pub use sqlite_backend::SqliteBackend;
pub use subscription::Subscription;
pub use traits::{AuthService, CollectionPath, Document, DocumentBackend, Fields, RemoteResult};
