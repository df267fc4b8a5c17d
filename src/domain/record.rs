//! Record Kinds
//!
//! Items and other costs share one shape: a label, a positive amount and
//! two server timestamps. Everything generic over that shape (adapter,
//! repository, list state, aggregates) is written against [`Record`].

use std::fmt;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::entity::{Entity, RecordId, Timestamp};
use super::error::ValidationError;

/// The two per-user collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Item,
    OtherCost,
}

impl RecordKind {
    /// Collection name under `users/{uid}/`
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Item => "items",
            RecordKind::OtherCost => "otherCosts",
        }
    }

    /// Capitalized name used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Item => "Item",
            RecordKind::OtherCost => "Other cost",
        }
    }

    /// Count noun for dashboard labels ("1 item", "3 costs")
    pub fn noun(&self, count: usize) -> &'static str {
        match (self, count) {
            (RecordKind::Item, 1) => "item",
            (RecordKind::Item, _) => "items",
            (RecordKind::OtherCost, 1) => "cost",
            (RecordKind::OtherCost, _) => "costs",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// A cost record stored in one per-user collection
pub trait Record: Entity<Id = RecordId> + Serialize + DeserializeOwned + fmt::Debug + 'static {
    /// Fields supplied on create
    type Draft: Serialize + Clone + fmt::Debug + Send + Sync;
    /// Partial fields supplied on update; `None` leaves a field untouched
    type Patch: Serialize + Clone + fmt::Debug + Default + Send + Sync;

    const KIND: RecordKind;

    /// Monetary value counted by the aggregates
    fn amount(&self) -> Decimal;

    fn created_at(&self) -> Timestamp;

    fn updated_at(&self) -> Timestamp;

    /// Reject malformed drafts; returns the normalized (trimmed) draft
    fn validate_draft(draft: Self::Draft) -> Result<Self::Draft, ValidationError>;

    /// Same rules as drafts, applied to the fields present
    fn validate_patch(patch: Self::Patch) -> Result<Self::Patch, ValidationError>;

    /// Shallow merge of the present fields, bumping `updated_at`
    fn apply_patch(&mut self, patch: &Self::Patch, updated_at: Timestamp);
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn require_positive(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::new(field, format!("{} must be greater than 0", field)));
    }
    Ok(value)
}
