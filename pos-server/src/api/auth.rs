//! Login, logout, registration and the current-user probe

use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, extract::State};
use http::header::SET_COOKIE;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{LoginRequest, User, UserCreate};

use super::{ApiResult, internal, require_text};
use crate::auth::SessionIdentity;
use crate::auth::session::{clear_cookie, create_token, session_cookie};
use crate::db::{tenants, users};
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

/// Sign a session for `user` and attach it as a cookie
fn with_session(state: &AppState, user: User, status: http::StatusCode) -> Result<Response, AppError> {
    let identity = SessionIdentity::from_user(&user);
    let token = create_token(&identity, &state.session_secret, state.session_max_age_days)
        .map_err(|e| AppError::internal(format!("Failed to sign session: {e}")))?;
    let cookie = session_cookie(&token, state.session_max_age_days, state.secure_cookies)?;
    Ok((status, [(SET_COOKIE, cookie)], Json(user)).into_response())
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    require_text("username", &req.username)?;
    require_text("password", &req.password)?;

    let user = users::find_by_username(&state.pool, req.username.trim())
        .await
        .map_err(internal)?;

    // Same error for unknown user and wrong password
    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        tracing::info!(username = %req.username, "Login failed");
        return Err(AppError::invalid_credentials());
    };
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    tracing::info!(user_id = user.id, tenant_id = user.tenant_id, "User logged in");
    with_session(&state, user, http::StatusCode::OK)
}

/// POST /api/register: create a user and log it in
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<UserCreate>,
) -> Result<Response, AppError> {
    require_text("username", &req.username)?;
    require_text("password", &req.password)?;
    require_text("fullName", &req.full_name)?;

    tenants::find_by_id(&state.pool, req.tenant_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;

    if users::find_by_username(&state.pool, &req.username)
        .await
        .map_err(internal)?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::UsernameExists));
    }

    let hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    let user = users::create(&state.pool, &req, &hash).await.map_err(|e| {
        if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
            AppError::new(ErrorCode::UsernameExists)
        } else {
            internal(e)
        }
    })?;

    tracing::info!(user_id = user.id, tenant_id = user.tenant_id, "User registered");
    with_session(&state, user, http::StatusCode::CREATED)
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(SET_COOKIE, clear_cookie(state.secure_cookies))],
        ApiResponse::ok(),
    )
        .into_response()
}

/// GET /api/user: 401 (from the gate) when not logged in
pub async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<User> {
    let user = users::find_by_id(&state.pool, identity.user_id)
        .await
        .map_err(internal)?
        .filter(|u| u.is_active)
        .ok_or_else(AppError::not_authenticated)?;
    Ok(Json(user))
}
