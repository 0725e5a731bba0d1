//! User directory access: login lookup, full-name directory and seeding.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use tracing::info;

use crate::database::manager::StoreError;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub department: String,
}

impl User {
    /// Display name used for session snapshots and claim reporter values.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Stored credentials are compared here and nowhere else, so a hash scheme can
/// replace the plaintext comparison without touching call sites.
pub fn verify_password(stored: &str, provided: &str) -> bool {
    stored == provided
}

pub async fn find_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password, first_name, last_name, role, department \
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(user)
}

/// Scan the whole user set (the department-enrichment directory source).
pub async fn all(conn: &mut SqliteConnection) -> Result<Vec<User>, StoreError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, password, first_name, last_name, role, department FROM users",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(users)
}

/// Insert the initial administrator, but only into an otherwise empty user set.
pub async fn seed_admin(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;
    if count > 0 {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO users (username, password, first_name, last_name, role, department) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind("admin")
    .bind("admin123")
    .bind("System")
    .bind("Administrator")
    .bind(ADMIN_ROLE)
    .bind("IT")
    .execute(&mut *conn)
    .await?;

    info!("Seeded initial administrator account");
    Ok(())
}
