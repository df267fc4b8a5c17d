//! Repository Layer - Core Traits
//!
//! Defines the abstract interface the session gate and intent dispatch
//! use to reach one record kind's collection.

use async_trait::async_trait;

use crate::domain::{DomainResult, Record, RecordId, Timestamp, User};

/// CRUD over one record kind of one user
///
/// Every operation runs against the remote collection and then applies the
/// settled outcome to the client-side list.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Replace the local list with the remote one
    async fn fetch_all(&self, user: &User) -> DomainResult<Vec<R>>;

    /// Validate and store a new record; it lands at the front of the list
    async fn create(&self, user: &User, draft: R::Draft) -> DomainResult<R>;

    /// Validate and merge the present fields; returns the stamped updatedAt
    async fn update(&self, user: &User, id: &RecordId, patch: R::Patch) -> DomainResult<Timestamp>;

    /// Remove by id; a missing id is not an error
    async fn delete(&self, user: &User, id: &RecordId) -> DomainResult<()>;
}
