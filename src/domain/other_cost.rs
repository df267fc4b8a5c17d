//! Other Cost Entity
//!
//! Costs not tied to an item: shipping, taxes, insurance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, RecordId, Timestamp};
use super::error::ValidationError;
use super::record::{require_positive, require_text, Record, RecordKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherCost {
    pub id: RecordId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherCostDraft {
    pub description: String,
    pub amount: Decimal,
}

impl OtherCostDraft {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherCostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl OtherCostPatch {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Default::default()
        }
    }
}

impl From<OtherCostDraft> for OtherCostPatch {
    fn from(draft: OtherCostDraft) -> Self {
        Self {
            description: Some(draft.description),
            amount: Some(draft.amount),
        }
    }
}

impl Entity for OtherCost {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for OtherCost {
    type Draft = OtherCostDraft;
    type Patch = OtherCostPatch;

    const KIND: RecordKind = RecordKind::OtherCost;

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn validate_draft(draft: OtherCostDraft) -> Result<OtherCostDraft, ValidationError> {
        Ok(OtherCostDraft {
            description: require_text("description", &draft.description)?,
            amount: require_positive("amount", draft.amount)?,
        })
    }

    fn validate_patch(patch: OtherCostPatch) -> Result<OtherCostPatch, ValidationError> {
        Ok(OtherCostPatch {
            description: patch
                .description
                .as_deref()
                .map(|description| require_text("description", description))
                .transpose()?,
            amount: patch.amount.map(|amount| require_positive("amount", amount)).transpose()?,
        })
    }

    fn apply_patch(&mut self, patch: &OtherCostPatch, updated_at: Timestamp) {
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        self.updated_at = updated_at;
    }
}
