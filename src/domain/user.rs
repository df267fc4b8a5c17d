//! User Entity

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Authenticated identity, read-only once signed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier assigned at sign-up
    pub uid: String,
    pub email: String,
}

impl User {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

impl Entity for User {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.uid
    }
}
