//! Account administration and the activity log

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use salespulse_common::db::activity::{self, RECENT_LOG_LIMIT};
use salespulse_common::db::{users, Role};
use serde_json::json;
use tracing::info;

use super::auth::{create_account, Credentials, CurrentUser};
use super::extract::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let users = users::list_users(&state.db).await?;
    Ok(Json(json!({ "users": users })))
}

/// POST /api/users (any role, including `dev`)
pub async fn add_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(creds): ApiJson<Credentials>,
) -> ApiResult<impl IntoResponse> {
    if creds.username.trim().is_empty() || creds.password.is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }
    let role: Role = creds.role.parse()?;

    let created = create_account(&state, &creds.username, creds.password, role).await?;
    activity::log_activity(
        &state.db,
        user.id(),
        "user_add",
        &format!("Added user: {} ({})", created.username, created.role),
    )
    .await?;
    info!(user = %created.username, role = %created.role, "User added");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User added",
            "user": created,
        })),
    ))
}

/// DELETE /api/users/:id
///
/// Removes the account together with its feedback and activity rows.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    if id == user.id() {
        return Err(ApiError::BadRequest("Cannot delete yourself".to_string()));
    }

    let target = users::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;
    users::delete_user(&state.db, id).await?;

    activity::log_activity(
        &state.db,
        user.id(),
        "user_delete",
        &format!("Deleted user: {}", target.username),
    )
    .await?;
    info!(id, user = %target.username, "User deleted");

    Ok(Json(json!({ "message": "User deleted" })))
}

/// GET /api/logs
pub async fn list_logs(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let logs = activity::recent_logs(&state.db, RECENT_LOG_LIMIT).await?;
    Ok(Json(json!({ "logs": logs })))
}
