//! Daily statistics

use rust_decimal::Decimal;
use shared::models::Stat;
use sqlx::PgPool;

/// Most recent `days` rows, newest first
pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64, days: i64) -> Result<Vec<Stat>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM stats WHERE tenant_id = $1 ORDER BY date DESC LIMIT $2")
        .bind(tenant_id)
        .bind(days)
        .fetch_all(pool)
        .await
}

pub async fn find_for_day(pool: &PgPool, tenant_id: i64, day: i64) -> Result<Option<Stat>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM stats WHERE tenant_id = $1 AND date = $2")
        .bind(tenant_id)
        .bind(day)
        .fetch_optional(pool)
        .await
}

/// Fold one completed order into the day's row, creating it when missing.
/// `average_check` is revenue per guest.
pub async fn record_sale(
    pool: &PgPool,
    tenant_id: i64,
    day: i64,
    amount: Decimal,
    customers: i32,
) -> Result<Stat, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO stats (tenant_id, date, daily_revenue, customer_count, average_check)
        VALUES ($1, $2, $3, $4, ROUND($3 / GREATEST($4, 1), 2))
        ON CONFLICT (tenant_id, date) DO UPDATE SET
            daily_revenue = stats.daily_revenue + EXCLUDED.daily_revenue,
            customer_count = stats.customer_count + EXCLUDED.customer_count,
            average_check = ROUND(
                (stats.daily_revenue + EXCLUDED.daily_revenue)
                / GREATEST(stats.customer_count + EXCLUDED.customer_count, 1),
                2
            )
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(day)
    .bind(amount)
    .bind(customers)
    .fetch_one(pool)
    .await
}
