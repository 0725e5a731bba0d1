use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use thiserror::Error;
use tracing::info;

use crate::config;

/// Errors from the claims store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CREATE_USERS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    role TEXT NOT NULL DEFAULT 'user',
    department TEXT NOT NULL DEFAULT ''
)";

const CREATE_CLAIMS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS claims (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    claim_number TEXT NOT NULL,
    status TEXT,
    submission_date TEXT,
    created_at TEXT,
    reporter TEXT,
    department TEXT,
    title TEXT NOT NULL,
    description TEXT
)";

/// Handle factory for the SQLite claims store.
///
/// Every request acquires its own short-lived connection; nothing is pooled or
/// shared across requests, and the connection is released when it drops on any
/// exit path.
#[derive(Debug, Clone)]
pub struct StoreManager {
    path: PathBuf,
}

impl StoreManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build a manager from `DATABASE_URL` (a plain path or `sqlite://` URL),
    /// falling back to `claims.db` in the working directory.
    pub fn from_env() -> Self {
        let raw = std::env::var("DATABASE_URL").unwrap_or_else(|_| "claims.db".to_string());
        Self::new(normalize_store_path(&raw))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection for a single request.
    pub async fn acquire(&self) -> Result<SqliteConnection, StoreError> {
        if self.path.as_os_str().is_empty() {
            return Err(StoreError::InvalidPath("empty store path".to_string()));
        }
        let cfg = &config::config().database;
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(cfg.create_if_missing)
            .busy_timeout(Duration::from_secs(cfg.busy_timeout_secs));
        let conn = SqliteConnection::connect_with(&options).await?;
        Ok(conn)
    }

    /// Create the tables and seed the initial administrator if the user set is
    /// empty. Run once at startup.
    pub async fn init(&self) -> Result<(), StoreError> {
        let mut conn = self.acquire().await?;
        sqlx::query(CREATE_USERS_TABLE).execute(&mut conn).await?;
        sqlx::query(CREATE_CLAIMS_TABLE).execute(&mut conn).await?;
        crate::users::seed_admin(&mut conn).await?;
        info!("Claims store ready at {}", self.path.display());
        Ok(())
    }

    /// Verify the store is reachable (used by /health).
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}

/// Accept both `sqlite://claims.db` URLs and bare filesystem paths.
fn normalize_store_path(raw: &str) -> String {
    raw.strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw)
        .to_string()
}
