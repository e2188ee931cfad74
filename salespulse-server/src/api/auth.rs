//! Login, self-registration and bearer-token middleware

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use salespulse_common::auth::{bearer_token, hash_password, verify_password};
use salespulse_common::db::{activity, now, users, Role, User};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::extract::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Authenticated caller, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// 403 unless the caller holds one of `roles`
    pub fn require(&self, roles: &[Role]) -> ApiResult<()> {
        if roles.contains(&self.0.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Unauthorized access".to_string()))
        }
    }

    pub fn id(&self) -> i64 {
        self.0.id
    }
}

/// Bearer-token middleware
///
/// Verifies the token and loads the user it names; a token for a deleted
/// user is rejected like a forged one.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Token is missing".to_string()))?;

    let token =
        bearer_token(header).ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    let claims = state.signer.verify(token).map_err(|e| {
        debug!("Token rejected: {}", e);
        ApiError::Unauthorized("Invalid token".to_string())
    })?;

    let user = users::find_by_id(&state.db, claims.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

async fn require_role(roles: &[Role], request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::Unauthorized("Token is missing".to_string()))?;
    user.require(roles)?;
    Ok(next.run(request).await)
}

/// Route layer for `dev`-only endpoints
///
/// Runs ahead of the handler's extractors, so a caller with the wrong role
/// gets 403 whatever the body holds.
pub async fn dev_only(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&[Role::Dev], request, next).await
}

pub async fn manager_only(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&[Role::Manager], request, next).await
}

pub async fn salesperson_only(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&[Role::Salesperson], request, next).await
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl Credentials {
    fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.role.is_empty()
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(creds): ApiJson<Credentials>,
) -> ApiResult<Json<serde_json::Value>> {
    if !creds.is_complete() {
        return Err(ApiError::BadRequest("Missing credentials".to_string()));
    }

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let role: Role = creds.role.parse().map_err(|_| invalid())?;
    let mut user = users::find_for_login(&state.db, &creds.username, role)
        .await?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.clone();
    let password = creds.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;
    if !verified {
        return Err(invalid());
    }

    let at = now();
    users::touch_last_login(&state.db, user.id, at).await?;
    user.last_login = Some(at);

    // The audit entry is best-effort; a failed write never blocks a login
    if let Err(e) = activity::log_activity(
        &state.db,
        user.id,
        "login",
        &format!("User logged in as {}", role),
    )
    .await
    {
        warn!("Failed to record login for {}: {}", user.username, e);
    }

    let token = state.signer.issue(user.id, user.role)?;
    info!(user = %user.username, role = %role, "Login");

    Ok(Json(json!({
        "token": token,
        "user": user,
    })))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(creds): ApiJson<Credentials>,
) -> ApiResult<impl IntoResponse> {
    if !creds.is_complete() {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let role = creds
        .role
        .parse::<Role>()
        .ok()
        .filter(Role::self_registrable)
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid role selected for public registration".to_string())
        })?;

    let user = create_account(&state, &creds.username, creds.password, role).await?;

    if let Err(e) = activity::log_activity(
        &state.db,
        user.id,
        "register",
        &format!("New user self-registered: {} ({})", user.username, role),
    )
    .await
    {
        warn!("Failed to record registration for {}: {}", user.username, e);
    }
    info!(user = %user.username, role = %role, "Registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Registration successful! Please login." })),
    ))
}

/// Hash on the blocking pool, then insert
pub(crate) async fn create_account(
    state: &AppState,
    username: &str,
    password: String,
    role: Role,
) -> ApiResult<User> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    Ok(users::create_user(&state.db, username, &hash, role).await?)
}
