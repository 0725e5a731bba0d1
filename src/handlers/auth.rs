//! Authentication handlers: login, logout, me.

use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::SessionToken;
use crate::session::AuthUser;
use crate::state::AppState;
use crate::users;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login - exchange credentials for an opaque session token.
///
/// The failure message never discloses which of the two fields was wrong.
pub async fn login(
    State(state): State<AppState>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<Value>, ApiError> {
    let payload = payload
        .map(|Json(p)| p)
        .ok_or_else(|| ApiError::bad_request("Username and password are required"))?;

    let username = payload.username.as_deref().unwrap_or("").trim().to_string();
    // Only blank-checked; the stored password must match byte for byte
    let password = payload.password.as_deref().unwrap_or("");
    if username.is_empty() || password.trim().is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let mut conn = state.store.acquire().await?;
    let user = users::find_by_username(&mut conn, &username).await?;

    let user = match user {
        Some(u) if users::verify_password(&u.password, password) => u,
        _ => return Err(ApiError::unauthorized("Invalid credentials")),
    };

    let snapshot = AuthUser::from(&user);
    let token = state.sessions.create(snapshot.clone()).await;
    tracing::info!(username = %snapshot.username, "User logged in");

    Ok(Json(json!({ "token": token, "user": snapshot })))
}

/// POST /api/auth/logout - revoke the session the request arrived on.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<Json<Value>, ApiError> {
    state.sessions.remove(&token).await;
    tracing::info!(username = %user.username, "User logged out");
    Ok(Json(json!({ "ok": true })))
}

/// GET /api/auth/me - current session's user snapshot.
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({ "user": user }))
}
