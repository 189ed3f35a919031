//! Dashboard aggregate

use rust_decimal::Decimal;
use shared::models::{
    ActiveOrderDetail, DashboardData, DiningTable, PopularItem, TableStatus, TableSummary,
};
use shared::money;
use shared::util::{day_start_millis, elapsed_minutes};
use sqlx::PgPool;

use super::{order_items, orders, stats, tables};

const POPULAR_ITEMS_LIMIT: i64 = 5;

/// Build the dashboard for `tenant_id` as of `now` (millis)
pub async fn load(pool: &PgPool, tenant_id: i64, now: i64) -> Result<DashboardData, sqlx::Error> {
    let today = day_start_millis(now);
    let stat = stats::find_for_day(pool, tenant_id, today).await?;
    let tables = tables::list_by_tenant(pool, tenant_id).await?;

    let mut active_orders = Vec::new();
    for order in orders::list_active_by_tenant(pool, tenant_id).await? {
        let Some(table) = order
            .table_id
            .and_then(|tid| tables.iter().find(|t| t.id == tid))
        else {
            continue;
        };
        let items = order_items::list_details_by_order(pool, order.id).await?;
        let total = items.iter().fold(money::to_money(Decimal::ZERO), |acc, d| {
            money::add_line(acc, d.item.unit_price, d.item.quantity)
        });

        let mut order = order;
        order.total_amount = total;
        active_orders.push(ActiveOrderDetail {
            duration: elapsed_minutes(order.start_time, now),
            table: TableSummary {
                id: table.id,
                name: table.name.clone(),
            },
            order,
            items,
        });
    }

    let popular_items = popular_items(pool, tenant_id, today).await?;

    let (daily_revenue, customer_count, average_check) = match &stat {
        Some(s) => (s.daily_revenue, s.customer_count, s.average_check),
        None => (
            money::to_money(Decimal::ZERO),
            0,
            money::to_money(Decimal::ZERO),
        ),
    };

    Ok(DashboardData {
        daily_revenue,
        customer_count,
        average_check,
        occupancy_rate: occupancy_rate(&tables),
        tables,
        active_orders,
        popular_items,
    })
}

/// Percentage of active tables that are not empty, two decimals
pub fn occupancy_rate(tables: &[DiningTable]) -> Decimal {
    let active: Vec<_> = tables.iter().filter(|t| t.is_active).collect();
    if active.is_empty() {
        return money::to_money(Decimal::ZERO);
    }
    let busy = active
        .iter()
        .filter(|t| t.status != TableStatus::Empty)
        .count();
    money::to_money(Decimal::from(busy as i64 * 100) / Decimal::from(active.len() as i64))
}

/// Menu items ranked by quantity ordered since `since`
async fn popular_items(
    pool: &PgPool,
    tenant_id: i64,
    since: i64,
) -> Result<Vec<PopularItem>, sqlx::Error> {
    let rows: Vec<(i64, String, i64)> = sqlx::query_as(
        r#"
        SELECT mi.id, mi.name, SUM(oi.quantity)::BIGINT AS count
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN menu_items mi ON mi.id = oi.menu_item_id
        WHERE o.tenant_id = $1 AND oi.created_at >= $2 AND oi.status <> 'cancelled'
        GROUP BY mi.id, mi.name
        ORDER BY count DESC, mi.id
        LIMIT $3
        "#,
    )
    .bind(tenant_id)
    .bind(since)
    .bind(POPULAR_ITEMS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, count)| PopularItem { id, name, count })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: i64, status: TableStatus, is_active: bool) -> DiningTable {
        DiningTable {
            id,
            tenant_id: 1,
            area_id: 1,
            name: format!("T{id}"),
            capacity: 4,
            pos_x: 0,
            pos_y: 0,
            status,
            is_active,
        }
    }

    #[test]
    fn test_occupancy_rate() {
        let tables = vec![
            table(1, TableStatus::Occupied, true),
            table(2, TableStatus::BillRequested, true),
            table(3, TableStatus::Empty, true),
            table(4, TableStatus::Occupied, false),
        ];
        assert_eq!(occupancy_rate(&tables).to_string(), "66.67");
        assert_eq!(occupancy_rate(&[]).to_string(), "0.00");
    }
}
