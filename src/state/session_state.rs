//! Session Container
//!
//! `Unauthenticated -> Authenticating -> Authenticated`, or back to
//! `Unauthenticated` (with an error) when the attempt fails.
//! `Authenticated -> Unauthenticated` on sign-out.

use crate::domain::User;

/// Which form the auth screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated(User),
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    status: SessionStatus,
    error: Option<String>,
    mode: AuthMode,
}

impl SessionState {
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn user(&self) -> Option<&User> {
        match &self.status {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated(_))
    }

    /// True while a sign-in, sign-up or session restore is in flight
    pub fn is_authenticating(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticating)
    }

    /// Last authentication failure, shown on the auth screen
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Only legal from `Unauthenticated`
    pub fn begin_authentication(&mut self) -> bool {
        if self.status != SessionStatus::Unauthenticated {
            return false;
        }
        self.status = SessionStatus::Authenticating;
        self.error = None;
        true
    }

    /// Only legal from `Authenticating`
    pub fn authenticated(&mut self, user: User) -> bool {
        if !self.is_authenticating() {
            return false;
        }
        self.status = SessionStatus::Authenticated(user);
        self.error = None;
        true
    }

    /// Attempt finished without a user; `None` when there was simply no session
    pub fn authentication_failed(&mut self, error: Option<String>) -> bool {
        if !self.is_authenticating() {
            return false;
        }
        self.status = SessionStatus::Unauthenticated;
        self.error = error;
        true
    }

    pub fn signed_out(&mut self) -> bool {
        let changed = self.status != SessionStatus::Unauthenticated || self.error.is_some();
        self.status = SessionStatus::Unauthenticated;
        self.error = None;
        changed
    }

    pub fn toggle_mode(&mut self) -> AuthMode {
        self.mode = self.mode.toggled();
        self.error = None;
        self.mode
    }
}
