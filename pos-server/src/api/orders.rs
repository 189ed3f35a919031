//! Orders and order items. Every write goes through [`crate::orders::OrderService`].

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Order, OrderCreate, OrderItem, OrderItemCreate, OrderItemDetail, OrderItemUpdate,
    OrderListQuery, OrderUpdate,
};

use super::{ApiResult, Created, created, internal};
use crate::auth::SessionIdentity;
use crate::db::{order_items, orders, tables};
use crate::state::AppState;

/// GET /api/tenants/{tid}/orders?active=true
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Vec<Order>> {
    identity.ensure_tenant(tid)?;
    let orders = if query.active {
        orders::list_active_by_tenant(&state.pool, tid).await
    } else {
        orders::list_by_tenant(&state.pool, tid).await
    }
    .map_err(internal)?;
    Ok(Json(orders))
}

pub async fn list_table_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(table_id): Path<i64>,
) -> ApiResult<Vec<Order>> {
    let table = tables::find_by_id(&state.pool, table_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
    identity.ensure_tenant(table.tenant_id)?;

    let orders = orders::list_by_table(&state.pool, table_id)
        .await
        .map_err(internal)?;
    Ok(Json(orders))
}

/// POST /api/tenants/{tid}/orders: opens the order and occupies the table
pub async fn create_order(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
    Json(data): Json<OrderCreate>,
) -> Created<Order> {
    identity.ensure_tenant(tid)?;
    let order = state
        .orders
        .open_order(tid, identity.user_id, &data)
        .await?;
    created(order)
}

pub async fn update_order(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(id): Path<i64>,
    Json(patch): Json<OrderUpdate>,
) -> ApiResult<Order> {
    let order = state
        .orders
        .update_order(identity.tenant_id, id, patch)
        .await?;
    Ok(Json(order))
}

/// GET /api/orders/{order_id}/items, each with its menu item summary
pub async fn list_order_items(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(order_id): Path<i64>,
) -> ApiResult<Vec<OrderItemDetail>> {
    let order = orders::find_by_id(&state.pool, order_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    identity.ensure_tenant(order.tenant_id)?;

    let items = order_items::list_details_by_order(&state.pool, order_id)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

pub async fn add_order_item(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(order_id): Path<i64>,
    Json(data): Json<OrderItemCreate>,
) -> Created<OrderItem> {
    let item = state
        .orders
        .add_order_item(identity.tenant_id, order_id, &data)
        .await?;
    created(item)
}

pub async fn update_order_item(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(id): Path<i64>,
    Json(patch): Json<OrderItemUpdate>,
) -> ApiResult<OrderItem> {
    let item = state
        .orders
        .update_order_item(identity.tenant_id, id, &patch)
        .await?;
    Ok(Json(item))
}
