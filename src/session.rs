//! Session Gate
//!
//! Drives the session container from the authentication service and
//! decides when the record lists are populated. Entering `Authenticated`
//! is the only thing that fetches both lists; signing out cancels live
//! subscriptions and empties them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{AuthError, DomainResult, User};
use crate::remote::{AuthService, Subscription};
use crate::repository::{ItemRepository, OtherCostRepository, Repository};
use crate::state::{AppStore, AuthMode};

pub const DEFAULT_RESTORE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SessionGate {
    auth: Arc<dyn AuthService>,
    store: AppStore,
    items: ItemRepository,
    other_costs: OtherCostRepository,
    live_sync: bool,
    restore_timeout: Duration,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl SessionGate {
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: AppStore,
        items: ItemRepository,
        other_costs: OtherCostRepository,
    ) -> Self {
        Self {
            auth,
            store,
            items,
            other_costs,
            live_sync: false,
            restore_timeout: DEFAULT_RESTORE_TIMEOUT,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Keep both lists fed by push subscriptions while signed in
    pub fn with_live_sync(mut self, live_sync: bool) -> Self {
        self.live_sync = live_sync;
        self
    }

    pub fn with_restore_timeout(mut self, timeout: Duration) -> Self {
        self.restore_timeout = timeout;
        self
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn items(&self) -> &ItemRepository {
        &self.items
    }

    pub fn other_costs(&self) -> &OtherCostRepository {
        &self.other_costs
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.current_user()
    }

    /// Signed-in user, or `NotSignedIn`
    pub fn require_user(&self) -> DomainResult<User> {
        self.current_user().ok_or_else(|| AuthError::NotSignedIn.into())
    }

    pub async fn active_subscriptions(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    /// Process-start check for a persisted session
    ///
    /// Resolves to `None` when there is no session, the check fails, or it
    /// does not answer within the restore timeout.
    pub async fn restore(&self) -> DomainResult<Option<User>> {
        if let Some(user) = self.current_user() {
            return Ok(Some(user));
        }
        if !self.store.begin_authentication() {
            return Err(AuthError::InProgress.into());
        }

        match tokio::time::timeout(self.restore_timeout, self.auth.current_user()).await {
            Ok(Ok(Some(user))) => {
                tracing::info!(uid = %user.uid, "session restored");
                self.enter(user.clone()).await;
                Ok(Some(user))
            }
            Ok(Ok(None)) => {
                self.store.authentication_failed(None);
                Ok(None)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "session restore failed");
                self.store.authentication_failed(None);
                Ok(None)
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.restore_timeout.as_millis() as u64, "session restore timed out");
                self.store.authentication_failed(None);
                Ok(None)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> DomainResult<User> {
        self.authenticate(AuthMode::SignIn, email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> DomainResult<User> {
        self.authenticate(AuthMode::SignUp, email, password).await
    }

    async fn authenticate(&self, mode: AuthMode, email: &str, password: &str) -> DomainResult<User> {
        if self.store.read(|state| state.session.is_authenticated()) {
            self.sign_out().await?;
        }
        if !self.store.begin_authentication() {
            return Err(AuthError::InProgress.into());
        }

        let result = match mode {
            AuthMode::SignIn => self.auth.sign_in(email, password).await,
            AuthMode::SignUp => self.auth.sign_up(email, password).await,
        };

        match result {
            Ok(user) => {
                tracing::info!(uid = %user.uid, ?mode, "authenticated");
                self.enter(user.clone()).await;
                Ok(user)
            }
            Err(e) => {
                tracing::info!(error = %e, ?mode, "authentication rejected");
                self.store.authentication_failed(Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Enter `Authenticated` and populate both lists
    async fn enter(&self, user: User) {
        if !self.store.authenticated(user.clone()) {
            return;
        }
        let entered = self.session_marker();

        // Failures already sit in the lists' error slots.
        let (items, other_costs) = tokio::join!(self.items.fetch_all(&user), self.other_costs.fetch_all(&user));
        if let Err(e) = items {
            tracing::warn!(error = %e, "initial item fetch failed");
        }
        if let Err(e) = other_costs {
            tracing::warn!(error = %e, "initial other cost fetch failed");
        }

        if !self.live_sync {
            return;
        }

        // Held until the subscriptions are registered, so a sign-out either
        // runs before the check below or drains what was pushed.
        let mut subscriptions = self.subscriptions.lock().await;
        if self.session_marker() != entered {
            tracing::debug!(uid = %user.uid, "session ended while loading; not subscribing");
            return;
        }
        let (items_epoch, other_costs_epoch) = (entered.1, entered.2);
        match self.items.watch(&user, items_epoch).await {
            Ok(subscription) => subscriptions.push(subscription),
            Err(e) => tracing::warn!(error = %e, "item subscription failed"),
        }
        match self.other_costs.watch(&user, other_costs_epoch).await {
            Ok(subscription) => subscriptions.push(subscription),
            Err(e) => tracing::warn!(error = %e, "other cost subscription failed"),
        }
    }

    /// Signed-in user plus both list epochs
    fn session_marker(&self) -> (Option<User>, u64, u64) {
        self.store.read(|state| {
            (
                state.session.user().cloned(),
                state.items.epoch(),
                state.other_costs.epoch(),
            )
        })
    }

    /// Leave the session; local state is cleared even if the service fails
    pub async fn sign_out(&self) -> DomainResult<()> {
        let subscriptions = {
            let mut active = self.subscriptions.lock().await;
            self.store.signed_out();
            std::mem::take(&mut *active)
        };
        for subscription in &subscriptions {
            subscription.cancel();
        }

        let result = self.auth.sign_out().await;

        match result {
            Ok(()) => {
                tracing::info!("signed out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-out reported an error");
                Err(e.into())
            }
        }
    }

    pub fn toggle_auth_mode(&self) -> AuthMode {
        self.store.toggle_auth_mode()
    }
}
