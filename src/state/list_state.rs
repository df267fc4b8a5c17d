//! Record List Container
//!
//! In-memory copy of one record kind's collection plus its request status.
//! Every asynchronous operation against the list runs through a ticket:
//! `request_started` hands one out, and the settled outcome is applied
//! with that ticket. The list is loading while any ticket is outstanding,
//! so overlapping requests cannot clear each other's loading state.
//!
//! Tickets also carry the list's epoch. `reset` (sign-out) starts a new
//! epoch, and outcomes of requests issued before it are dropped.

use std::collections::BTreeSet;

use crate::domain::{Record, RecordId, Timestamp};

/// Handle of one outstanding request against a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    epoch: u64,
    seq: u64,
}

impl RequestTicket {
    /// Never issued, so never settles anything
    pub(crate) const UNISSUED: Self = Self {
        epoch: u64::MAX,
        seq: u64::MAX,
    };

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Successful outcome of a request
#[derive(Debug, Clone)]
pub enum Settled<R: Record> {
    Fetched(Vec<R>),
    Created(R),
    Updated {
        id: RecordId,
        patch: R::Patch,
        updated_at: Timestamp,
    },
    Deleted(RecordId),
}

/// Observable status of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus<'a> {
    Idle,
    Loading,
    Failed(&'a str),
}

#[derive(Debug, Clone)]
pub struct RecordListState<R: Record> {
    records: Vec<R>,
    in_flight: BTreeSet<u64>,
    next_seq: u64,
    epoch: u64,
    error: Option<String>,
}

impl<R: Record> Default for RecordListState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            in_flight: BTreeSet::new(),
            next_seq: 0,
            epoch: 0,
            error: None,
        }
    }
}

impl<R: Record> RecordListState<R> {
    /// Records ordered by createdAt descending
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> ListStatus<'_> {
        if self.is_loading() {
            ListStatus::Loading
        } else if let Some(message) = &self.error {
            ListStatus::Failed(message)
        } else {
            ListStatus::Idle
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// request-started: mark loading and clear the error slot
    pub fn request_started(&mut self) -> RequestTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert(seq);
        self.error = None;
        RequestTicket {
            epoch: self.epoch,
            seq,
        }
    }

    /// Retire a ticket; false if it is stale or already settled
    fn settle(&mut self, ticket: RequestTicket) -> bool {
        ticket.epoch == self.epoch && self.in_flight.remove(&ticket.seq)
    }

    /// request-succeeded: apply the outcome; returns whether state changed
    pub fn request_succeeded(&mut self, ticket: RequestTicket, outcome: Settled<R>) -> bool {
        if !self.settle(ticket) {
            return false;
        }

        match outcome {
            Settled::Fetched(records) => self.records = records,
            Settled::Created(record) => {
                // A live snapshot may have delivered it already.
                self.records.retain(|existing| existing.id() != record.id());
                self.records.insert(0, record);
            }
            Settled::Updated { id, patch, updated_at } => {
                if let Some(record) = self.records.iter_mut().find(|record| record.id() == &id) {
                    record.apply_patch(&patch, updated_at);
                }
            }
            Settled::Deleted(id) => self.records.retain(|record| record.id() != &id),
        }
        true
    }

    /// request-failed: keep the records, expose the message
    pub fn request_failed(&mut self, ticket: RequestTicket, message: impl Into<String>) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        self.error = Some(message.into());
        true
    }

    /// Replace the records with a pushed snapshot taken during `epoch`
    pub fn apply_snapshot(&mut self, epoch: u64, records: Vec<R>) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.records = records;
        true
    }

    pub fn clear_error(&mut self) -> bool {
        self.error.take().is_some()
    }

    /// Drop all records and outstanding requests, starting a new epoch
    pub fn reset(&mut self) {
        self.records.clear();
        self.in_flight.clear();
        self.error = None;
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, ItemPatch};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn item(id: &str, name: &str, cost: i64, created: i64) -> Item {
        Item {
            id: RecordId::new(id),
            name: name.to_string(),
            cost: Decimal::new(cost, 0),
            created_at: at(created),
            updated_at: at(created),
        }
    }

    fn ids(state: &RecordListState<Item>) -> Vec<&str> {
        state.records().iter().map(|r| r.id.as_str()).collect()
    }

    fn loaded(records: Vec<Item>) -> RecordListState<Item> {
        let mut state = RecordListState::default();
        let ticket = state.request_started();
        state.request_succeeded(ticket, Settled::Fetched(records));
        state
    }

    #[test]
    fn test_request_started_sets_loading_and_clears_error() {
        let mut state = RecordListState::<Item>::default();
        let ticket = state.request_started();
        state.request_failed(ticket, "offline");
        assert_eq!(state.status(), ListStatus::Failed("offline"));

        state.request_started();
        assert!(state.is_loading());
        assert_eq!(state.error(), None);
        assert_eq!(state.status(), ListStatus::Loading);
    }

    #[test]
    fn test_fetch_replaces_records() {
        let mut state = loaded(vec![item("old", "Old", 1, 0)]);

        let ticket = state.request_started();
        state.request_succeeded(ticket, Settled::Fetched(vec![item("b", "B", 2, 2), item("a", "A", 1, 1)]));

        assert_eq!(ids(&state), vec!["b", "a"]);
        assert!(!state.is_loading());
        assert_eq!(state.status(), ListStatus::Idle);
    }

    #[test]
    fn test_create_prepends_exactly_once() {
        let mut state = loaded(vec![item("a", "A", 1, 1)]);

        let ticket = state.request_started();
        state.request_succeeded(ticket, Settled::Created(item("b", "B", 2, 2)));

        assert_eq!(ids(&state), vec!["b", "a"]);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_create_already_in_snapshot_is_not_duplicated() {
        let mut state = loaded(vec![item("a", "A", 1, 1)]);
        let ticket = state.request_started();

        let epoch = state.epoch();
        state.apply_snapshot(epoch, vec![item("b", "B", 2, 2), item("a", "A", 1, 1)]);
        state.request_succeeded(ticket, Settled::Created(item("b", "B", 2, 2)));

        assert_eq!(ids(&state), vec!["b", "a"]);
    }

    #[test]
    fn test_update_merges_in_place() {
        let mut state = loaded(vec![item("c", "C", 3, 3), item("b", "Monitor", 300, 2), item("a", "A", 1, 1)]);

        let ticket = state.request_started();
        state.request_succeeded(
            ticket,
            Settled::Updated {
                id: RecordId::new("b"),
                patch: ItemPatch::cost(Decimal::new(50, 0)),
                updated_at: at(10),
            },
        );

        assert_eq!(ids(&state), vec!["c", "b", "a"]);
        let updated = state.get(&RecordId::new("b")).unwrap();
        assert_eq!(updated.name, "Monitor");
        assert_eq!(updated.cost, Decimal::new(50, 0));
        assert_eq!(updated.updated_at, at(10));
        assert_eq!(updated.created_at, at(2));
    }

    #[test]
    fn test_update_of_unknown_id_changes_nothing() {
        let mut state = loaded(vec![item("a", "A", 1, 1)]);
        let before = state.records().to_vec();

        let ticket = state.request_started();
        state.request_succeeded(
            ticket,
            Settled::Updated {
                id: RecordId::new("zzz"),
                patch: ItemPatch::name("Ghost"),
                updated_at: at(5),
            },
        );

        assert_eq!(state.records(), before.as_slice());
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut state = loaded(vec![item("1", "One", 1, 3), item("42", "Answer", 42, 2), item("99", "Last", 99, 1)]);

        let ticket = state.request_started();
        state.request_succeeded(ticket, Settled::Deleted(RecordId::new("42")));

        assert_eq!(ids(&state), vec!["1", "99"]);
    }

    #[test]
    fn test_failure_keeps_records() {
        let mut state = loaded(vec![item("a", "A", 1, 1)]);
        let before = state.records().to_vec();

        let ticket = state.request_started();
        state.request_failed(ticket, "permission-denied");

        assert_eq!(state.records(), before.as_slice());
        assert_eq!(state.error(), Some("permission-denied"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_overlapping_requests_keep_loading_until_all_settle() {
        let mut state = RecordListState::<Item>::default();
        let first = state.request_started();
        let second = state.request_started();

        state.request_succeeded(first, Settled::Created(item("a", "A", 1, 1)));
        assert!(state.is_loading());

        state.request_succeeded(second, Settled::Created(item("b", "B", 2, 2)));
        assert!(!state.is_loading());
        assert_eq!(ids(&state), vec!["b", "a"]);
    }

    #[test]
    fn test_last_settled_failure_owns_error() {
        let mut state = RecordListState::<Item>::default();
        let first = state.request_started();
        let second = state.request_started();

        state.request_failed(second, "second failed");
        state.request_failed(first, "first failed");

        assert_eq!(state.error(), Some("first failed"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_ticket_settles_once() {
        let mut state = RecordListState::<Item>::default();
        let ticket = state.request_started();

        assert!(state.request_succeeded(ticket, Settled::Created(item("a", "A", 1, 1))));
        assert!(!state.request_succeeded(ticket, Settled::Created(item("a", "A", 1, 1))));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_reset_discards_stale_outcomes() {
        let mut state = loaded(vec![item("a", "A", 1, 1)]);
        let ticket = state.request_started();
        let old_epoch = state.epoch();

        state.reset();
        assert!(state.is_empty());
        assert!(!state.is_loading());

        assert!(!state.request_succeeded(ticket, Settled::Fetched(vec![item("x", "X", 9, 9)])));
        assert!(!state.apply_snapshot(old_epoch, vec![item("x", "X", 9, 9)]));
        assert!(state.is_empty());
    }
}
