//! Cost Tracker Application
//!
//! Wires configuration, logging, the local backend, the store and the
//! session gate together, and runs presentation intents against them.

use std::sync::Arc;

use crate::aggregates::CostSummary;
use crate::config::AppConfig;
use crate::domain::{DomainResult, Item, OtherCost, Record, User};
use crate::intents::{Intent, Notice};
use crate::remote::{init_db, AuthService, DocumentBackend, LocalAuthService, RemoteStoreAdapter, SqliteBackend};
use crate::repository::{ItemRepository, OtherCostRepository, Repository};
use crate::session::SessionGate;
use crate::state::AppStore;

pub const APP_NAME: &str = "cost-tracker";

pub struct CostTracker {
    config: AppConfig,
    gate: SessionGate,
}

impl CostTracker {
    /// Open the local backend described by `config`
    pub async fn open(config: AppConfig) -> DomainResult<Self> {
        if let Some(dir) = &config.log_dir {
            if !rolling_logger::is_initialized() {
                // Logging is optional; the tracker runs without it.
                if let Err(e) = rolling_logger::init_logger(dir, APP_NAME) {
                    eprintln!("[{}] {}", APP_NAME, e);
                }
            }
        }

        let db = match init_db(&config.database_path).await {
            Ok(db) => {
                let _ = rolling_logger::info("Database ready");
                db
            }
            Err(e) => {
                let _ = rolling_logger::error(&format!("Database init failed: {}", e));
                return Err(e.into());
            }
        };

        let backend = SqliteBackend::open(db.clone()).await?;
        let auth = LocalAuthService::new(db, config.password_hash_cost);
        Ok(Self::with_services(config, Arc::new(backend), Arc::new(auth)))
    }

    /// Build on already constructed backend services
    pub fn with_services(config: AppConfig, backend: Arc<dyn DocumentBackend>, auth: Arc<dyn AuthService>) -> Self {
        let adapter = Arc::new(RemoteStoreAdapter::new(backend));
        let store = AppStore::new();
        let gate = SessionGate::new(
            auth,
            store.clone(),
            ItemRepository::new(Arc::clone(&adapter), store.clone()),
            OtherCostRepository::new(adapter, store),
        )
        .with_live_sync(config.live_sync)
        .with_restore_timeout(config.session_restore_timeout());

        Self { config, gate }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &AppStore {
        self.gate.store()
    }

    pub fn session(&self) -> &SessionGate {
        &self.gate
    }

    /// Process start: restore a persisted session, if any
    pub async fn start(&self) -> DomainResult<Option<User>> {
        self.gate.restore().await
    }

    pub fn summary(&self) -> CostSummary {
        self.store().read(CostSummary::from_state)
    }

    /// Run one intent; success yields the notice to show, if any
    pub async fn dispatch(&self, intent: Intent) -> DomainResult<Option<Notice>> {
        tracing::debug!(intent = intent.name(), "dispatch");

        match intent {
            Intent::SignIn { email, password } => {
                self.gate.sign_in(&email, &password).await?;
                Ok(None)
            }
            Intent::SignUp { email, password } => {
                self.gate.sign_up(&email, &password).await?;
                Ok(None)
            }
            Intent::SignOut => {
                self.gate.sign_out().await?;
                Ok(None)
            }
            Intent::ToggleAuthMode => {
                self.gate.toggle_auth_mode();
                Ok(None)
            }
            Intent::CreateItem(draft) => {
                self.gate.items().create(&self.gate.require_user()?, draft).await?;
                Ok(Some(Notice::added(Item::KIND)))
            }
            Intent::UpdateItem { id, patch } => {
                self.gate.items().update(&self.gate.require_user()?, &id, patch).await?;
                Ok(Some(Notice::updated(Item::KIND)))
            }
            Intent::DeleteItem(id) => {
                self.gate.items().delete(&self.gate.require_user()?, &id).await?;
                Ok(Some(Notice::deleted(Item::KIND)))
            }
            Intent::CreateOtherCost(draft) => {
                self.gate.other_costs().create(&self.gate.require_user()?, draft).await?;
                Ok(Some(Notice::added(OtherCost::KIND)))
            }
            Intent::UpdateOtherCost { id, patch } => {
                self.gate
                    .other_costs()
                    .update(&self.gate.require_user()?, &id, patch)
                    .await?;
                Ok(Some(Notice::updated(OtherCost::KIND)))
            }
            Intent::DeleteOtherCost(id) => {
                self.gate.other_costs().delete(&self.gate.require_user()?, &id).await?;
                Ok(Some(Notice::deleted(OtherCost::KIND)))
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch), with failures turned into error notices
    pub async fn handle(&self, intent: Intent) -> Option<Notice> {
        match self.dispatch(intent).await {
            Ok(notice) => notice,
            Err(e) => Some(Notice::from_error(&e)),
        }
    }
}
