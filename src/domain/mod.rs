//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod error;
mod item;
mod other_cost;
mod record;
mod user;

pub use entity::{Entity, RecordId, Timestamp};
pub use error::{AuthError, DomainError, DomainResult, RemoteOperationError, ValidationError};
pub use item::{Item, ItemDraft, ItemPatch};
pub use other_cost::{OtherCost, OtherCostDraft, OtherCostPatch};
pub use record::{Record, RecordKind};
pub use user::User;
