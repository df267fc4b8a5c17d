//! Local Authentication Service
//!
//! Email/password accounts stored next to the documents, bcrypt-hashed.
//! The signed-in uid is persisted so a later process can restore the
//! session.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::db::Database;
use super::traits::AuthService;
use crate::domain::{AuthError, User};
use crate::forms::{is_valid_email, MIN_PASSWORD_LEN};

/// SQLite-backed implementation of [`AuthService`]
pub struct LocalAuthService {
    db: Database,
    hash_cost: u32,
}

impl LocalAuthService {
    pub fn new(db: Database, hash_cost: u32) -> Self {
        Self { db, hash_cost }
    }

    /// bcrypt on the blocking pool, off the executor
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }

    /// Verifies password against bcrypt hash, on the blocking pool
    async fn verify_password(password: &str, hash: String) -> Result<bool, AuthError> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl AuthService for LocalAuthService {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        // Hashed outside the connection lock.
        let password_hash = self.hash_password(password).await?;
        let user = User::new(Uuid::new_v4().simple().to_string(), email);
        let now = Utc::now().timestamp_millis();

        let mut conn = self.db.connection().await;
        let tx = conn.transaction()?;

        let taken: Option<String> = tx
            .query_row("SELECT uid FROM users WHERE email = ?1", params![email], |row| row.get(0))
            .optional()?;
        if taken.is_some() {
            return Err(AuthError::EmailAlreadyInUse);
        }

        tx.execute(
            "INSERT INTO users (uid, email, password_hash, created_at, last_sign_in_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![user.uid, user.email, password_hash, now],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO auth_session (slot, uid) VALUES (1, ?1)",
            params![user.uid],
        )?;
        tx.commit()?;

        tracing::info!(uid = %user.uid, "account created");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();

        let account: Option<(String, String, String)> = {
            let conn = self.db.connection().await;
            let account = conn
                .query_row(
                    "SELECT uid, email, password_hash FROM users WHERE email = ?1",
                    params![email],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;
            account
        };

        // Verified outside the connection lock.
        let (uid, stored_email, password_hash) = account.ok_or(AuthError::InvalidCredentials)?;
        if !Self::verify_password(password, password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let mut conn = self.db.connection().await;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE users SET last_sign_in_at = ?1 WHERE uid = ?2",
            params![Utc::now().timestamp_millis(), uid],
        )?;
        tx.execute("INSERT OR REPLACE INTO auth_session (slot, uid) VALUES (1, ?1)", params![uid])?;
        tx.commit()?;

        Ok(User::new(uid, stored_email))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let conn = self.db.connection().await;
        conn.execute("DELETE FROM auth_session", [])?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        let conn = self.db.connection().await;
        let user = conn
            .query_row(
                "SELECT u.uid, u.email FROM auth_session s JOIN users u ON u.uid = s.uid WHERE s.slot = 1",
                [],
                |row| Ok(User::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(user)
    }
}
