use shared::models::{User, UserCreate};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE tenant_id = $1 ORDER BY id")
        .bind(tenant_id)
        .fetch_all(pool)
        .await
}

/// Insert a user; `password_hash` must already be an argon2 hash
pub async fn create(
    pool: &PgPool,
    data: &UserCreate,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO users (tenant_id, username, password_hash, full_name, role, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING *
        "#,
    )
    .bind(data.tenant_id)
    .bind(&data.username)
    .bind(password_hash)
    .bind(&data.full_name)
    .bind(data.role)
    .fetch_one(pool)
    .await
}
