//! Project Cost Tracker
//!
//! Per-user cost records (items and other costs) kept in a document store,
//! mirrored into an observable client-side store, and summed into project
//! totals.
//!
//! Layers, leaf-first:
//! - `domain`: entities, record kinds, errors
//! - `remote`: document backend, authentication, typed adapter
//! - `repository`: validation boundary and request lifecycle per record kind
//! - `state`: list and session containers, the store
//! - `aggregates`: derived totals
//! - `session`: the authentication gate
//! - `app`: wiring and intent dispatch

pub mod aggregates;
pub mod app;
pub mod config;
pub mod domain;
pub mod forms;
pub mod intents;
pub mod money;
pub mod remote;
pub mod repository;
pub mod session;
pub mod state;

pub use aggregates::{items_total, other_costs_total, project_total, CostSummary};
pub use app::CostTracker;
pub use config::{AppConfig, ConfigError};
pub use domain::{
    AuthError, DomainError, DomainResult, Item, ItemDraft, ItemPatch, OtherCost, OtherCostDraft, OtherCostPatch,
    RecordId, RemoteOperationError, User, ValidationError,
};
pub use intents::{Intent, Notice, NoticeLevel};
pub use session::SessionGate;
pub use state::{AppState, AppStore};
