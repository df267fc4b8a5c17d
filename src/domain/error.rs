//! Domain Errors
//!
//! Three failure families cross component boundaries: input rejected
//! before any remote call, failures reported by the remote store, and
//! authentication failures.

use thiserror::Error;

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Payload rejected before reaching the remote store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Offending field, e.g. `"cost"`
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Network, permission or not-found failure reported by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteOperationError {
    message: String,
}

impl RemoteOperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(format!("not-found: {}", what))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<rusqlite::Error> for RemoteOperationError {
    fn from(err: rusqlite::Error) -> Self {
        Self::new(format!("unavailable: {}", err))
    }
}

impl From<serde_json::Error> for RemoteOperationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("data-loss: malformed document: {}", err))
    }
}

/// Sign-in / sign-up failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Email is already in use")]
    EmailAlreadyInUse,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("Email is invalid")]
    InvalidEmail,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Authentication already in progress")]
    InProgress,

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        AuthError::Unavailable(err.to_string())
    }
}

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteOperationError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DomainError {
    /// Human-readable message shown to the user and stored in error slots
    pub fn message(&self) -> String {
        match self {
            DomainError::Validation(e) => e.message.clone(),
            DomainError::Remote(e) => e.message().to_string(),
            DomainError::Auth(e) => e.to_string(),
        }
    }
}
