use shared::models::{DEFAULT_THEME_COLOR, Tenant, TenantCreate};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Tenant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tenants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(pool: &PgPool, data: &TenantCreate, now: i64) -> Result<Tenant, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO tenants (name, logo, address, phone, email, theme_color, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(&data.logo)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(data.theme_color.as_deref().unwrap_or(DEFAULT_THEME_COLOR))
    .bind(now)
    .fetch_one(pool)
    .await
}
