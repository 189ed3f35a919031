//! Dining table database operations

use shared::models::{
    DEFAULT_TABLE_CAPACITY, DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus,
};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM dining_tables WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<Vec<DiningTable>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM dining_tables WHERE tenant_id = $1 ORDER BY area_id, id")
        .bind(tenant_id)
        .fetch_all(pool)
        .await
}

pub async fn list_by_area(pool: &PgPool, area_id: i64) -> Result<Vec<DiningTable>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM dining_tables WHERE area_id = $1 ORDER BY id")
        .bind(area_id)
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    tenant_id: i64,
    data: &DiningTableCreate,
) -> Result<DiningTable, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO dining_tables (tenant_id, area_id, name, capacity, pos_x, pos_y, status, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(data.area_id)
    .bind(&data.name)
    .bind(data.capacity.unwrap_or(DEFAULT_TABLE_CAPACITY))
    .bind(data.pos_x.unwrap_or(0))
    .bind(data.pos_y.unwrap_or(0))
    .bind(data.status.unwrap_or(TableStatus::Empty))
    .bind(data.is_active.unwrap_or(true))
    .fetch_one(pool)
    .await
}

/// Partial update; absent fields keep their value. `None` when the row does not exist.
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &DiningTableUpdate,
) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE dining_tables SET
            area_id = COALESCE($2, area_id),
            name = COALESCE($3, name),
            capacity = COALESCE($4, capacity),
            pos_x = COALESCE($5, pos_x),
            pos_y = COALESCE($6, pos_y),
            status = COALESCE($7, status),
            is_active = COALESCE($8, is_active)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.area_id)
    .bind(&data.name)
    .bind(data.capacity)
    .bind(data.pos_x)
    .bind(data.pos_y)
    .bind(data.status)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}
