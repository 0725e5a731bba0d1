//! In-memory session store.
//!
//! Sessions are opaque UUID tokens mapped to a snapshot of the authenticated
//! user. The map starts empty at process start, entries disappear on logout,
//! and everything is discarded at shutdown. There is no expiry.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::{User, ADMIN_ROLE};

/// Authenticated user snapshot bound to a session token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub department: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name(),
            role: user.role.clone(),
            department: user.department.clone(),
        }
    }
}

/// Concurrency-safe token -> user map shared by all in-flight requests.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AuthUser>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an unguessable token and bind the user snapshot to it.
    pub async fn create(&self, user: AuthUser) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), user);
        token
    }

    pub async fn get(&self, token: &str) -> Option<AuthUser> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Remove a session. Returns whether the token existed.
    pub async fn remove(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token).is_some()
    }
}
