//! Order database operations

use rust_decimal::Decimal;
use shared::models::{Order, OrderStatus, OrderUpdate};
use sqlx::PgPool;

/// Row values for a freshly opened order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub tenant_id: i64,
    pub table_id: Option<i64>,
    pub user_id: i64,
    pub customer_count: i32,
    pub start_time: i64,
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE tenant_id = $1 ORDER BY start_time DESC")
        .bind(tenant_id)
        .fetch_all(pool)
        .await
}

pub async fn list_active_by_tenant(
    pool: &PgPool,
    tenant_id: i64,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM orders WHERE tenant_id = $1 AND status = $2 ORDER BY start_time",
    )
    .bind(tenant_id)
    .bind(OrderStatus::Active)
    .fetch_all(pool)
    .await
}

pub async fn list_by_table(pool: &PgPool, table_id: i64) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE table_id = $1 ORDER BY start_time DESC")
        .bind(table_id)
        .fetch_all(pool)
        .await
}

pub async fn count_active_by_table(pool: &PgPool, table_id: i64) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE table_id = $1 AND status = $2")
            .bind(table_id)
            .bind(OrderStatus::Active)
            .fetch_one(pool)
            .await?;
    Ok(n)
}

pub async fn create(pool: &PgPool, data: &NewOrder) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO orders (tenant_id, table_id, user_id, status, start_time, total_amount, customer_count)
        VALUES ($1, $2, $3, $4, $5, 0.00, $6)
        RETURNING *
        "#,
    )
    .bind(data.tenant_id)
    .bind(data.table_id)
    .bind(data.user_id)
    .bind(OrderStatus::Active)
    .bind(data.start_time)
    .bind(data.customer_count)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &OrderUpdate,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET
            status = COALESCE($2, status),
            end_time = COALESCE($3, end_time),
            total_amount = COALESCE($4, total_amount),
            is_paid = COALESCE($5, is_paid),
            payment_method = COALESCE($6, payment_method),
            customer_count = COALESCE($7, customer_count)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.status)
    .bind(data.end_time)
    .bind(data.total_amount)
    .bind(data.is_paid)
    .bind(&data.payment_method)
    .bind(data.customer_count)
    .fetch_optional(pool)
    .await
}

/// Atomically add `amount` to the running total
pub async fn add_to_total(
    pool: &PgPool,
    id: i64,
    amount: Decimal,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE orders SET total_amount = ROUND(total_amount + $2, 2) WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(amount)
    .fetch_optional(pool)
    .await
}
