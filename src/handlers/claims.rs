//! Claims handlers. Thin glue: parse the request, open the per-request store
//! connection, delegate to the engine, serialize the result.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Map, Value};

use crate::claims::ClaimsEngine;
use crate::database::schema::ColumnInfo;
use crate::error::ApiError;
use crate::session::AuthUser;
use crate::state::AppState;

/// GET /api/claims/schema - column metadata of the live claims table.
pub async fn schema(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Vec<ColumnInfo>>, ApiError> {
    let mut conn = state.store.acquire().await?;
    let columns = ClaimsEngine::new(&mut conn).schema().await?;
    Ok(Json(columns))
}

/// GET /api/claims - rows visible to the caller, enriched and identity-tagged.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.store.acquire().await?;
    let rows = ClaimsEngine::new(&mut conn).list(&user).await?;
    Ok(Json(Value::Array(rows.into_iter().map(Value::Object).collect())))
}

/// POST /api/claims - create a claim from the (possibly absent) request body.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = parse_fields(payload)?;
    let mut conn = state.store.acquire().await?;
    let row = ClaimsEngine::new(&mut conn).create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(Value::Object(row))))
}

/// PUT /api/claims/:id - overwrite the provided columns of one claim.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let row_id = parse_row_id(&id)?;
    let input = parse_fields(payload)?;
    let mut conn = state.store.acquire().await?;
    let row = ClaimsEngine::new(&mut conn).update(&user, row_id, input).await?;
    Ok(Json(Value::Object(row)))
}

/// DELETE /api/claims/:id - remove one claim by identity.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let row_id = parse_row_id(&id)?;
    let mut conn = state.store.acquire().await?;
    let removed = ClaimsEngine::new(&mut conn).delete(&user, row_id).await?;
    Ok(Json(json!({ "ok": true, "rowId": removed })))
}

/// The id path segment must parse as an integer before the store is touched.
fn parse_row_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::bad_request("Invalid claim id"))
}

/// Absent bodies become an empty field set; non-object bodies are rejected.
fn parse_fields(payload: Option<Json<Value>>) -> Result<Map<String, Value>, ApiError> {
    match payload {
        None => Ok(Map::new()),
        Some(Json(Value::Object(map))) => Ok(map),
        Some(_) => Err(ApiError::bad_request("Expected a JSON object body")),
    }
}
