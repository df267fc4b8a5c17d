//! Database Connection and Setup
//!
//! Manages the SQLite connection backing the local emulation of the
//! hosted backend, and its migrations.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::RemoteOperationError;

/// Shared connection handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub async fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

/// Open the database at `db_path` (`:memory:` for a private in-memory one)
pub async fn init_db(db_path: &Path) -> Result<Database, RemoteOperationError> {
    let conn = if db_path.as_os_str() == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(db_path)?
    };

    run_migrations(&conn)?;
    tracing::debug!(path = %db_path.display(), "database initialized");

    Ok(Database {
        conn: Arc::new(Mutex::new(conn)),
    })
}

fn run_migrations(conn: &Connection) -> Result<(), RemoteOperationError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (collection, id)
        );

        CREATE TABLE IF NOT EXISTS users (
            uid TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            last_sign_in_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS auth_session (
            slot INTEGER PRIMARY KEY CHECK (slot = 1),
            uid TEXT NOT NULL REFERENCES users(uid) ON DELETE CASCADE
        );",
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_order ON documents(collection, created_at DESC)",
        [],
    )?;

    Ok(())
}
