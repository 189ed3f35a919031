//! Categories and menu items

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryCreate, MenuItem, MenuItemCreate, MenuItemUpdate};
use shared::money;

use super::{ApiResult, Created, created, internal, require_text};
use crate::auth::SessionIdentity;
use crate::db::{categories, menu_items};
use crate::state::AppState;

async fn owned_category(
    state: &AppState,
    identity: &SessionIdentity,
    category_id: i64,
) -> Result<Category, AppError> {
    let category = categories::find_by_id(&state.pool, category_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    identity.ensure_tenant(category.tenant_id)?;
    Ok(category)
}

fn checked_price(price: rust_decimal::Decimal) -> Result<rust_decimal::Decimal, AppError> {
    if !money::is_valid_price(price) {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice)
            .with_detail("price", price.to_string()));
    }
    Ok(money::to_money(price))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
) -> ApiResult<Vec<Category>> {
    identity.ensure_tenant(tid)?;
    let categories = categories::list_by_tenant(&state.pool, tid)
        .await
        .map_err(internal)?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
    Json(data): Json<CategoryCreate>,
) -> Created<Category> {
    identity.ensure_tenant(tid)?;
    require_text("name", &data.name)?;
    let category = categories::create(&state.pool, tid, &data)
        .await
        .map_err(internal)?;
    created(category)
}

pub async fn list_menu_items(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
) -> ApiResult<Vec<MenuItem>> {
    identity.ensure_tenant(tid)?;
    let items = menu_items::list_by_tenant(&state.pool, tid)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

pub async fn list_category_menu_items(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(cid): Path<i64>,
) -> ApiResult<Vec<MenuItem>> {
    owned_category(&state, &identity, cid).await?;
    let items = menu_items::list_by_category(&state.pool, cid)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

pub async fn create_menu_item(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(tid): Path<i64>,
    Json(data): Json<MenuItemCreate>,
) -> Created<MenuItem> {
    identity.ensure_tenant(tid)?;
    require_text("name", &data.name)?;
    let price = checked_price(data.price)?;
    owned_category(&state, &identity, data.category_id).await?;

    let item = menu_items::create(&state.pool, tid, &data, price)
        .await
        .map_err(internal)?;
    tracing::info!(tenant_id = tid, menu_item_id = item.id, "Menu item created");
    created(item)
}

/// Existing order items keep their snapshotted price
pub async fn update_menu_item(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(id): Path<i64>,
    Json(mut patch): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    let current = menu_items::find_by_id(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    identity.ensure_tenant(current.tenant_id)?;

    if let Some(price) = patch.price {
        patch.price = Some(checked_price(price)?);
    }
    if let Some(category_id) = patch.category_id {
        owned_category(&state, &identity, category_id).await?;
    }

    let item = menu_items::update(&state.pool, id, &patch)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    Ok(Json(item))
}
