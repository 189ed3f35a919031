use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{Area, AreaCreate};

use super::{ApiResult, Created, created, internal, require_text};
use crate::auth::SessionIdentity;
use crate::db::areas;
use crate::state::AppState;

pub async fn list_areas(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
) -> ApiResult<Vec<Area>> {
    identity.ensure_tenant(tid)?;
    let areas = areas::list_by_tenant(&state.pool, tid)
        .await
        .map_err(internal)?;
    Ok(Json(areas))
}

pub async fn create_area(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
    Json(data): Json<AreaCreate>,
) -> Created<Area> {
    identity.ensure_tenant(tid)?;
    require_text("name", &data.name)?;
    let area = areas::create(&state.pool, tid, &data)
        .await
        .map_err(internal)?;
    tracing::info!(tenant_id = tid, area_id = area.id, "Area created");
    created(area)
}
