//! Record Repository
//!
//! One generic repository, instantiated per record kind. It is the only
//! validation boundary: drafts and patches are checked here and never reach
//! the adapter when malformed. Remote outcomes are settled into the store
//! with the ticket taken when the request started, then handed back to the
//! caller (errors included).

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use super::traits::Repository;
use crate::domain::{DomainResult, Item, OtherCost, RecordId, RemoteOperationError, Timestamp, User};
use crate::remote::{RemoteStoreAdapter, Subscription};
use crate::state::{AppStore, RequestTicket, Settled, StoreSlice};

pub type ItemRepository = RecordRepository<Item>;
pub type OtherCostRepository = RecordRepository<OtherCost>;

pub struct RecordRepository<R: StoreSlice> {
    adapter: Arc<RemoteStoreAdapter>,
    store: AppStore,
    _kind: PhantomData<fn() -> R>,
}

impl<R: StoreSlice> Clone for RecordRepository<R> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            store: self.store.clone(),
            _kind: PhantomData,
        }
    }
}

impl<R: StoreSlice> RecordRepository<R> {
    pub fn new(adapter: Arc<RemoteStoreAdapter>, store: AppStore) -> Self {
        Self {
            adapter,
            store,
            _kind: PhantomData,
        }
    }

    /// Apply a settled remote result to the list, then pass it on
    fn settle<T>(
        &self,
        operation: &'static str,
        ticket: RequestTicket,
        result: Result<T, RemoteOperationError>,
        outcome: impl FnOnce(&T) -> Settled<R>,
    ) -> DomainResult<T> {
        match result {
            Ok(value) => {
                if !self.store.request_succeeded(ticket, outcome(&value)) {
                    tracing::debug!(kind = %R::KIND, operation, "dropped result of a previous session");
                }
                Ok(value)
            }
            Err(err) => {
                if !self.store.request_failed::<R>(ticket, err.message()) {
                    tracing::debug!(kind = %R::KIND, operation, "dropped failure of a previous session");
                }
                Err(err.into())
            }
        }
    }

    /// Feed live snapshots of the user's collection into the list
    ///
    /// Snapshots are applied only while the list is still at `epoch`; once
    /// it is reset (sign-out) they are ignored.
    pub async fn watch(&self, user: &User, epoch: u64) -> DomainResult<Subscription> {
        let store = self.store.clone();
        let subscription = self
            .adapter
            .subscribe::<R, _>(user, move |records| {
                if !store.apply_snapshot(epoch, records) {
                    tracing::debug!(kind = %R::KIND, "ignored snapshot of a previous session");
                }
            })
            .await?;
        Ok(subscription)
    }
}

#[async_trait]
impl<R: StoreSlice> Repository<R> for RecordRepository<R> {
    async fn fetch_all(&self, user: &User) -> DomainResult<Vec<R>> {
        let ticket = self.store.request_started::<R>();
        let result = self.adapter.list::<R>(user).await;
        self.settle("fetch", ticket, result, |records| Settled::Fetched(records.clone()))
    }

    async fn create(&self, user: &User, draft: R::Draft) -> DomainResult<R> {
        let draft = R::validate_draft(draft)?;

        let ticket = self.store.request_started::<R>();
        let result = self.adapter.create::<R>(user, &draft).await;
        let record = self.settle("create", ticket, result, |record| Settled::Created(record.clone()))?;

        tracing::info!(kind = %R::KIND, id = %record.id(), "record created");
        Ok(record)
    }

    async fn update(&self, user: &User, id: &RecordId, patch: R::Patch) -> DomainResult<Timestamp> {
        let patch = R::validate_patch(patch)?;

        let ticket = self.store.request_started::<R>();
        let result = self.adapter.update::<R>(user, id, &patch).await;
        self.settle("update", ticket, result, |updated_at| Settled::Updated {
            id: id.clone(),
            patch: patch.clone(),
            updated_at: *updated_at,
        })
    }

    async fn delete(&self, user: &User, id: &RecordId) -> DomainResult<()> {
        let ticket = self.store.request_started::<R>();
        let result = self.adapter.delete::<R>(user, id).await;
        self.settle("delete", ticket, result, |_| Settled::Deleted(id.clone()))?;

        tracing::info!(kind = %R::KIND, id = %id, "record deleted");
        Ok(())
    }
}
