//! Menu item database operations

use rust_decimal::Decimal;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items WHERE tenant_id = $1 ORDER BY category_id, id")
        .bind(tenant_id)
        .fetch_all(pool)
        .await
}

pub async fn list_by_category(
    pool: &PgPool,
    category_id: i64,
) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items WHERE category_id = $1 ORDER BY id")
        .bind(category_id)
        .fetch_all(pool)
        .await
}

/// `price` is passed separately so callers rescale it once
pub async fn create(
    pool: &PgPool,
    tenant_id: i64,
    data: &MenuItemCreate,
    price: Decimal,
) -> Result<MenuItem, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO menu_items (
            tenant_id, category_id, name, description, image, price,
            preparation_time, is_available, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.image)
    .bind(price)
    .bind(data.preparation_time)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.is_active.unwrap_or(true))
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &MenuItemUpdate,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE menu_items SET
            category_id = COALESCE($2, category_id),
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            image = COALESCE($5, image),
            price = COALESCE($6, price),
            preparation_time = COALESCE($7, preparation_time),
            is_available = COALESCE($8, is_available),
            is_active = COALESCE($9, is_active)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.image)
    .bind(data.price)
    .bind(data.preparation_time)
    .bind(data.is_available)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}
