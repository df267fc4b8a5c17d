//! Item Entity
//!
//! A purchased item (hardware, software, services) with its cost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, RecordId, Timestamp};
use super::error::ValidationError;
use super::record::{require_positive, require_text, Record, RecordKind};

/// A project item with a cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Assigned by the remote store
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    /// Documents without a cost decode as zero
    #[serde(default)]
    pub cost: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields for a new item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub cost: Decimal,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, cost: Decimal) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}

/// Partial update of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
}

impl ItemPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn cost(cost: Decimal) -> Self {
        Self {
            cost: Some(cost),
            ..Default::default()
        }
    }
}

/// An edit form submits every field
impl From<ItemDraft> for ItemPatch {
    fn from(draft: ItemDraft) -> Self {
        Self {
            name: Some(draft.name),
            cost: Some(draft.cost),
        }
    }
}

impl Entity for Item {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Item {
    type Draft = ItemDraft;
    type Patch = ItemPatch;

    const KIND: RecordKind = RecordKind::Item;

    fn amount(&self) -> Decimal {
        self.cost
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn validate_draft(draft: ItemDraft) -> Result<ItemDraft, ValidationError> {
        Ok(ItemDraft {
            name: require_text("name", &draft.name)?,
            cost: require_positive("cost", draft.cost)?,
        })
    }

    fn validate_patch(patch: ItemPatch) -> Result<ItemPatch, ValidationError> {
        Ok(ItemPatch {
            name: patch.name.as_deref().map(|name| require_text("name", name)).transpose()?,
            cost: patch.cost.map(|cost| require_positive("cost", cost)).transpose()?,
        })
    }

    fn apply_patch(&mut self, patch: &ItemPatch, updated_at: Timestamp) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        self.updated_at = updated_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(name: &str, cost: i64) -> Item {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        Item {
            id: RecordId::new("a1"),
            name: name.to_string(),
            cost: Decimal::new(cost, 0),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_validate_draft_trims_name() {
        let draft = Item::validate_draft(ItemDraft::new("  MacBook Pro ", Decimal::new(2499, 0))).unwrap();
        assert_eq!(draft.name, "MacBook Pro");
    }

    #[test]
    fn test_validate_draft_rejects_blank_name() {
        let err = Item::validate_draft(ItemDraft::new(" ", Decimal::ONE)).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_validate_draft_rejects_zero_cost() {
        let err = Item::validate_draft(ItemDraft::new("License", Decimal::ZERO)).unwrap_err();
        assert_eq!(err.field, "cost");
    }

    #[test]
    fn test_validate_patch_only_checks_present_fields() {
        assert!(Item::validate_patch(ItemPatch::cost(Decimal::new(50, 0))).is_ok());
        assert!(Item::validate_patch(ItemPatch::name("")).is_err());
        assert!(Item::validate_patch(ItemPatch::default()).is_ok());
    }

    #[test]
    fn test_apply_patch_is_partial() {
        let mut target = item("Monitor", 300);
        let later = Utc.timestamp_millis_opt(1_700_000_500_000).unwrap();

        target.apply_patch(&ItemPatch::cost(Decimal::new(50, 0)), later);

        assert_eq!(target.name, "Monitor");
        assert_eq!(target.cost, Decimal::new(50, 0));
        assert_eq!(target.updated_at, later);
        assert_ne!(target.created_at, later);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let json = serde_json::to_value(ItemPatch::name("Desk")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Desk" }));
    }

    #[test]
    fn test_missing_cost_decodes_as_zero() {
        let decoded: Item = serde_json::from_value(serde_json::json!({
            "id": "x",
            "name": "Freebie",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(decoded.amount(), Decimal::ZERO);
    }
}
