use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    DiningTable, DiningTableUpdate, MenuItem, Order, OrderItem, OrderItemUpdate, OrderUpdate,
    Stat,
};
use sqlx::PgPool;

use super::PosStore;
use crate::db::order_items::NewOrderItem;
use crate::db::orders::NewOrder;
use crate::db::{menu_items, order_items, orders, stats, tables};
use crate::error::ServiceResult;

/// [`PosStore`] backed by Postgres
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PosStore for PgStore {
    async fn find_table(&self, id: i64) -> ServiceResult<Option<DiningTable>> {
        Ok(tables::find_by_id(&self.pool, id).await?)
    }

    async fn update_table(
        &self,
        id: i64,
        patch: &DiningTableUpdate,
    ) -> ServiceResult<Option<DiningTable>> {
        Ok(tables::update(&self.pool, id, patch).await?)
    }

    async fn find_order(&self, id: i64) -> ServiceResult<Option<Order>> {
        Ok(orders::find_by_id(&self.pool, id).await?)
    }

    async fn create_order(&self, data: &NewOrder) -> ServiceResult<Order> {
        Ok(orders::create(&self.pool, data).await?)
    }

    async fn update_order(&self, id: i64, patch: &OrderUpdate) -> ServiceResult<Option<Order>> {
        Ok(orders::update(&self.pool, id, patch).await?)
    }

    async fn add_to_order_total(&self, id: i64, amount: Decimal) -> ServiceResult<Option<Order>> {
        Ok(orders::add_to_total(&self.pool, id, amount).await?)
    }

    async fn count_active_orders_for_table(&self, table_id: i64) -> ServiceResult<i64> {
        Ok(orders::count_active_by_table(&self.pool, table_id).await?)
    }

    async fn find_menu_item(&self, id: i64) -> ServiceResult<Option<MenuItem>> {
        Ok(menu_items::find_by_id(&self.pool, id).await?)
    }

    async fn find_order_item(&self, id: i64) -> ServiceResult<Option<OrderItem>> {
        Ok(order_items::find_by_id(&self.pool, id).await?)
    }

    async fn create_order_item(&self, data: &NewOrderItem) -> ServiceResult<OrderItem> {
        Ok(order_items::create(&self.pool, data).await?)
    }

    async fn update_order_item(
        &self,
        id: i64,
        patch: &OrderItemUpdate,
    ) -> ServiceResult<Option<OrderItem>> {
        Ok(order_items::update(&self.pool, id, patch).await?)
    }

    async fn record_sale(
        &self,
        tenant_id: i64,
        day: i64,
        amount: Decimal,
        customers: i32,
    ) -> ServiceResult<Stat> {
        Ok(stats::record_sale(&self.pool, tenant_id, day, amount, customers).await?)
    }
}
