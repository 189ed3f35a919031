//! Dashboard and daily stats

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::models::{DashboardData, Stat, StatsQuery};
use shared::util::now_millis;

use super::{ApiResult, internal};
use crate::auth::SessionIdentity;
use crate::db::{dashboard, stats};
use crate::state::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
) -> ApiResult<DashboardData> {
    identity.ensure_tenant(tid)?;
    let data = dashboard::load(&state.pool, tid, now_millis())
        .await
        .map_err(internal)?;
    Ok(Json(data))
}

/// GET /api/tenants/{tid}/stats?days=N, newest first
pub async fn list_stats(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Vec<Stat>> {
    identity.ensure_tenant(tid)?;
    let stats = stats::list_by_tenant(&state.pool, tid, query.days())
        .await
        .map_err(internal)?;
    Ok(Json(stats))
}
