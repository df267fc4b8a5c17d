//! Global Application State Store
//!
//! One store with typed slices (session, items, other costs). State only
//! changes through the transitions below; consumers `subscribe` and are
//! notified after every transition that changed something.

use std::sync::Arc;

use tokio::sync::watch;

use super::list_state::{RecordListState, RequestTicket, Settled};
use super::session_state::{AuthMode, SessionState};
use crate::domain::{Item, OtherCost, Record, User};

/// Global application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: SessionState,
    /// Items of the signed-in user, newest first
    pub items: RecordListState<Item>,
    /// Other costs of the signed-in user, newest first
    pub other_costs: RecordListState<OtherCost>,
}

/// Record kinds that own a list slice of [`AppState`]
pub trait StoreSlice: Record {
    fn slice(state: &AppState) -> &RecordListState<Self>;

    fn slice_mut(state: &mut AppState) -> &mut RecordListState<Self>;
}

impl StoreSlice for Item {
    fn slice(state: &AppState) -> &RecordListState<Self> {
        &state.items
    }

    fn slice_mut(state: &mut AppState) -> &mut RecordListState<Self> {
        &mut state.items
    }
}

impl StoreSlice for OtherCost {
    fn slice(state: &AppState) -> &RecordListState<Self> {
        &state.other_costs
    }

    fn slice_mut(state: &mut AppState) -> &mut RecordListState<Self> {
        &mut state.other_costs
    }
}

/// Shared handle to the store; clones refer to the same state
#[derive(Clone)]
pub struct AppStore {
    state: Arc<watch::Sender<AppState>>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Change notifications; `borrow()` on the receiver reads the latest state
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn read<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.state.borrow())
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read(|state| state.session.user().cloned())
    }

    pub fn records<R: StoreSlice>(&self) -> Vec<R> {
        self.read(|state| R::slice(state).records().to_vec())
    }

    /// Run `f`; receivers are notified only if it reports a change
    ///
    /// `initial` is returned unchanged should `f` never run.
    fn update<T>(&self, initial: T, f: impl FnOnce(&mut AppState) -> (T, bool)) -> T {
        let mut out = initial;
        self.state.send_if_modified(|state| {
            let (value, changed) = f(state);
            out = value;
            changed
        });
        out
    }

    // ========================
    // Record list transitions
    // ========================

    pub fn request_started<R: StoreSlice>(&self) -> RequestTicket {
        self.update(RequestTicket::UNISSUED, |state| (R::slice_mut(state).request_started(), true))
    }

    pub fn request_succeeded<R: StoreSlice>(&self, ticket: RequestTicket, outcome: Settled<R>) -> bool {
        self.update(false, |state| {
            let applied = R::slice_mut(state).request_succeeded(ticket, outcome);
            (applied, applied)
        })
    }

    pub fn request_failed<R: StoreSlice>(&self, ticket: RequestTicket, message: impl Into<String>) -> bool {
        self.update(false, |state| {
            let applied = R::slice_mut(state).request_failed(ticket, message);
            (applied, applied)
        })
    }

    pub fn list_epoch<R: StoreSlice>(&self) -> u64 {
        self.read(|state| R::slice(state).epoch())
    }

    pub fn apply_snapshot<R: StoreSlice>(&self, epoch: u64, records: Vec<R>) -> bool {
        self.update(false, |state| {
            let applied = R::slice_mut(state).apply_snapshot(epoch, records);
            (applied, applied)
        })
    }

    pub fn clear_error<R: StoreSlice>(&self) -> bool {
        self.update(false, |state| {
            let cleared = R::slice_mut(state).clear_error();
            (cleared, cleared)
        })
    }

    // ========================
    // Session transitions
    // ========================

    pub fn begin_authentication(&self) -> bool {
        self.update(false, |state| {
            let started = state.session.begin_authentication();
            (started, started)
        })
    }

    pub fn authenticated(&self, user: User) -> bool {
        self.update(false, |state| {
            let entered = state.session.authenticated(user);
            (entered, entered)
        })
    }

    pub fn authentication_failed(&self, error: Option<String>) -> bool {
        self.update(false, |state| {
            let failed = state.session.authentication_failed(error);
            (failed, failed)
        })
    }

    /// Leave the session and drop every record of it, in one notification
    pub fn signed_out(&self) {
        self.update((), |state| {
            state.session.signed_out();
            state.items.reset();
            state.other_costs.reset();
            ((), true)
        })
    }

    pub fn toggle_auth_mode(&self) -> AuthMode {
        self.update(AuthMode::default(), |state| (state.session.toggle_mode(), true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemPatch, RecordId};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn item(id: &str, cost: i64) -> Item {
        let now = Utc::now();
        Item {
            id: RecordId::new(id),
            name: format!("item {}", id),
            cost: Decimal::new(cost, 0),
            created_at: now,
            updated_at: now,
        }
    }

    fn signed_in_store() -> AppStore {
        let store = AppStore::new();
        store.begin_authentication();
        store.authenticated(User::new("u1", "ada@example.com"));
        store
    }

    #[test]
    fn test_transitions_notify_subscribers() {
        let store = AppStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let ticket = store.request_started::<Item>();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().items.is_loading());

        store.request_succeeded(ticket, Settled::Created(item("a", 10)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().items.len(), 1);
    }

    #[test]
    fn test_stale_outcome_does_not_notify() {
        let store = signed_in_store();
        let ticket = store.request_started::<Item>();
        store.signed_out();

        let mut rx = store.subscribe();
        rx.borrow_and_update();
        assert!(!store.request_succeeded(ticket, Settled::Fetched(vec![item("x", 1)])));
        assert!(!rx.has_changed().unwrap());
        assert!(store.records::<Item>().is_empty());
    }

    #[test]
    fn test_unissued_ticket_settles_nothing() {
        let store = signed_in_store();
        let ticket = store.request_started::<Item>();

        assert!(!store.request_succeeded(RequestTicket::UNISSUED, Settled::Created(item("x", 1))));
        assert!(!store.request_failed::<Item>(RequestTicket::UNISSUED, "boom"));
        assert!(store.records::<Item>().is_empty());
        assert!(store.read(|state| state.items.is_loading()));

        assert!(store.request_succeeded::<Item>(ticket, Settled::Fetched(vec![])));
        assert!(!store.read(|state| state.items.is_loading()));
    }

    #[test]
    fn test_slices_are_independent() {
        let store = signed_in_store();
        let ticket = store.request_started::<Item>();

        store.read(|state| {
            assert!(state.items.is_loading());
            assert!(!state.other_costs.is_loading());
        });

        store.request_failed::<Item>(ticket, "unavailable");
        assert_eq!(store.read(|state| state.other_costs.error().map(str::to_string)), None);
        assert!(store.clear_error::<Item>());
    }

    #[test]
    fn test_sign_out_clears_both_lists() {
        let store = signed_in_store();
        let t1 = store.request_started::<Item>();
        store.request_succeeded(t1, Settled::Fetched(vec![item("a", 1)]));
        let t2 = store.request_started::<Item>();
        store.request_succeeded::<Item>(
            t2,
            Settled::Updated {
                id: RecordId::new("a"),
                patch: ItemPatch::cost(Decimal::new(7, 0)),
                updated_at: Utc::now(),
            },
        );
        assert_eq!(store.records::<Item>()[0].cost, Decimal::new(7, 0));

        store.signed_out();

        let state = store.snapshot();
        assert!(state.items.is_empty());
        assert!(state.other_costs.is_empty());
        assert_eq!(state.session.user(), None);
    }
}
