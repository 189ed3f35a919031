use shared::models::{Area, AreaCreate};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Area>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM areas WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<Vec<Area>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM areas WHERE tenant_id = $1 ORDER BY id")
        .bind(tenant_id)
        .fetch_all(pool)
        .await
}

pub async fn create(pool: &PgPool, tenant_id: i64, data: &AreaCreate) -> Result<Area, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO areas (tenant_id, name, is_active) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(tenant_id)
    .bind(&data.name)
    .bind(data.is_active.unwrap_or(true))
    .fetch_one(pool)
    .await
}
