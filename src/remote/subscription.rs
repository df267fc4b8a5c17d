//! Push subscription handle

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;

use super::traits::CollectionPath;

/// Cancellation handle of a live collection listener
///
/// `cancel` may be called any number of times; only the first call
/// releases the listener. Dropping the handle cancels it as well.
pub struct Subscription {
    collection: CollectionPath,
    task: JoinHandle<()>,
    cancelled: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(collection: CollectionPath, task: JoinHandle<()>) -> Self {
        Self {
            collection,
            task,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.task.abort();
        tracing::debug!(collection = %self.collection, "subscription cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
