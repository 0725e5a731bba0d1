//! Row-level access control.

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::session::AuthUser;

/// Decide whether `user` may mutate `row`.
///
/// Administrators may mutate any row. Everyone else may only touch rows whose
/// reporter equals their own full name. When the table has no reporter column
/// there is no authorship to check against and access degrades to allowing
/// everyone.
pub fn ensure_can_modify(
    row: &Map<String, Value>,
    user: &AuthUser,
    reporter_key: Option<&str>,
) -> Result<(), ApiError> {
    if user.is_admin() {
        return Ok(());
    }

    let Some(key) = reporter_key else {
        return Ok(());
    };

    let reporter = row.get(key).and_then(|v| v.as_str()).unwrap_or("");
    if reporter == user.full_name {
        Ok(())
    } else {
        Err(ApiError::forbidden("You can only modify your own claims"))
    }
}
