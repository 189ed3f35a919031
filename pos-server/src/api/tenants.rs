use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Tenant, User};

use super::{ApiResult, internal};
use crate::auth::SessionIdentity;
use crate::db::{tenants, users};
use crate::state::AppState;

pub async fn get_tenant(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
) -> ApiResult<Tenant> {
    identity.ensure_tenant(tid)?;
    let tenant = tenants::find_by_id(&state.pool, tid)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;
    Ok(Json(tenant))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
) -> ApiResult<Vec<User>> {
    identity.ensure_tenant(tid)?;
    let users = users::list_by_tenant(&state.pool, tid)
        .await
        .map_err(internal)?;
    Ok(Json(users))
}
