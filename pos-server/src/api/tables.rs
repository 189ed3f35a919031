use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Area, DiningTable, DiningTableCreate, DiningTableUpdate};

use super::{ApiResult, Created, created, internal, require_text};
use crate::auth::SessionIdentity;
use crate::db::{areas, tables};
use crate::state::AppState;

/// Area that exists and belongs to the session tenant
async fn owned_area(
    state: &AppState,
    identity: &SessionIdentity,
    area_id: i64,
) -> Result<Area, AppError> {
    let area = areas::find_by_id(&state.pool, area_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AreaNotFound))?;
    identity.ensure_tenant(area.tenant_id)?;
    Ok(area)
}

pub async fn list_tables(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
) -> ApiResult<Vec<DiningTable>> {
    identity.ensure_tenant(tid)?;
    let tables = tables::list_by_tenant(&state.pool, tid)
        .await
        .map_err(internal)?;
    Ok(Json(tables))
}

pub async fn list_area_tables(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(area_id): Path<i64>,
) -> ApiResult<Vec<DiningTable>> {
    owned_area(&state, &identity, area_id).await?;
    let tables = tables::list_by_area(&state.pool, area_id)
        .await
        .map_err(internal)?;
    Ok(Json(tables))
}

pub async fn create_table(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
    Json(data): Json<DiningTableCreate>,
) -> Created<DiningTable> {
    identity.ensure_tenant(tid)?;
    require_text("name", &data.name)?;
    if data.capacity.is_some_and(|c| c < 1) {
        return Err(AppError::validation("capacity must be at least 1"));
    }
    owned_area(&state, &identity, data.area_id).await?;

    let table = tables::create(&state.pool, tid, &data)
        .await
        .map_err(internal)?;
    tracing::info!(tenant_id = tid, table_id = table.id, "Table created");
    created(table)
}

/// PATCH /api/tables/{id}: broadcasts `table_updated`
pub async fn update_table(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(id): Path<i64>,
    Json(patch): Json<DiningTableUpdate>,
) -> ApiResult<DiningTable> {
    if let Some(area_id) = patch.area_id {
        owned_area(&state, &identity, area_id).await?;
    }
    let table = state
        .orders
        .update_table(identity.tenant_id, id, &patch)
        .await?;
    Ok(Json(table))
}
