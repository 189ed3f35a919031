//! Order item database operations

use rust_decimal::Decimal;
use shared::models::{MenuItemSummary, OrderItem, OrderItemDetail, OrderItemStatus, OrderItemUpdate};
use sqlx::PgPool;

/// Row values for a new order line
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    pub created_at: i64,
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    item: OrderItem,
    menu_name: Option<String>,
    menu_price: Option<Decimal>,
}

impl From<DetailRow> for OrderItemDetail {
    fn from(row: DetailRow) -> Self {
        let menu_item = match (row.menu_name, row.menu_price) {
            (Some(name), Some(price)) => Some(MenuItemSummary {
                id: row.item.menu_item_id,
                name,
                price,
            }),
            _ => None,
        };
        OrderItemDetail {
            item: row.item,
            menu_item,
        }
    }
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_order(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

/// Items of one order joined with their menu item summary
pub async fn list_details_by_order(
    pool: &PgPool,
    order_id: i64,
) -> Result<Vec<OrderItemDetail>, sqlx::Error> {
    let rows: Vec<DetailRow> = sqlx::query_as(
        r#"
        SELECT oi.*, mi.name AS menu_name, mi.price AS menu_price
        FROM order_items oi
        LEFT JOIN menu_items mi ON mi.id = oi.menu_item_id
        WHERE oi.order_id = $1
        ORDER BY oi.id
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn create(pool: &PgPool, data: &NewOrderItem) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price, status, notes, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(data.order_id)
    .bind(data.menu_item_id)
    .bind(data.quantity)
    .bind(data.unit_price)
    .bind(OrderItemStatus::New)
    .bind(&data.notes)
    .bind(data.created_at)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &OrderItemUpdate,
) -> Result<Option<OrderItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE order_items SET
            status = COALESCE($2, status),
            quantity = COALESCE($3, quantity),
            notes = COALESCE($4, notes)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.status)
    .bind(data.quantity)
    .bind(&data.notes)
    .fetch_optional(pool)
    .await
}
