//! Presentation Boundary
//!
//! Intents raised by forms, lists and the auth screen, and the transient
//! notices shown after they settle.

use crate::domain::{DomainError, ItemDraft, ItemPatch, OtherCostDraft, OtherCostPatch, RecordId, RecordKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
    ToggleAuthMode,
    CreateItem(ItemDraft),
    UpdateItem { id: RecordId, patch: ItemPatch },
    DeleteItem(RecordId),
    CreateOtherCost(OtherCostDraft),
    UpdateOtherCost { id: RecordId, patch: OtherCostPatch },
    DeleteOtherCost(RecordId),
}

impl Intent {
    /// Name safe to log; credentials stay out of it
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SignIn { .. } => "sign-in",
            Intent::SignUp { .. } => "sign-up",
            Intent::SignOut => "sign-out",
            Intent::ToggleAuthMode => "toggle-auth-mode",
            Intent::CreateItem(_) => "create-item",
            Intent::UpdateItem { .. } => "update-item",
            Intent::DeleteItem(_) => "delete-item",
            Intent::CreateOtherCost(_) => "create-other-cost",
            Intent::UpdateOtherCost { .. } => "update-other-cost",
            Intent::DeleteOtherCost(_) => "delete-other-cost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast-style message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: None,
        }
    }

    pub fn added(kind: RecordKind) -> Self {
        Self::success(format!("{} added successfully", kind.label()))
    }

    pub fn updated(kind: RecordKind) -> Self {
        Self::success(format!("{} updated successfully", kind.label()))
    }

    pub fn deleted(kind: RecordKind) -> Self {
        Self::success(format!("{} deleted successfully", kind.label()))
    }

    /// The error message verbatim, or a generic line when it is empty
    pub fn from_error(err: &DomainError) -> Self {
        let message = err.message();
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            description: Some(if message.is_empty() {
                "Something went wrong".to_string()
            } else {
                message
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RemoteOperationError;

    #[test]
    fn test_success_titles() {
        assert_eq!(Notice::added(RecordKind::Item).title, "Item added successfully");
        assert_eq!(Notice::updated(RecordKind::OtherCost).title, "Other cost updated successfully");
        assert_eq!(Notice::deleted(RecordKind::Item).title, "Item deleted successfully");
    }

    #[test]
    fn test_error_notice_carries_message() {
        let err = DomainError::from(RemoteOperationError::new("permission-denied"));
        let notice = Notice::from_error(&err);

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.description.as_deref(), Some("permission-denied"));

        let empty = DomainError::from(RemoteOperationError::new(""));
        assert_eq!(Notice::from_error(&empty).description.as_deref(), Some("Something went wrong"));
    }
}
