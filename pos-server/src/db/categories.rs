use shared::models::{Category, CategoryCreate};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE tenant_id = $1 ORDER BY sort_order, id")
        .bind(tenant_id)
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    tenant_id: i64,
    data: &CategoryCreate,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO categories (tenant_id, name, image, sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&data.image)
    .bind(data.sort_order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .fetch_one(pool)
    .await
}
