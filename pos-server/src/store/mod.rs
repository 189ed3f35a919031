//! Persistence seam for the mutation funnel
//!
//! [`PosStore`] covers exactly the reads and writes [`crate::orders::OrderService`]
//! performs. Production uses [`PgStore`]; unit tests use an in-memory store.

mod pg;

#[cfg(test)]
pub mod memory;

pub use pg::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    DiningTable, DiningTableUpdate, MenuItem, Order, OrderItem, OrderItemUpdate, OrderUpdate,
    Stat,
};

use crate::db::order_items::NewOrderItem;
use crate::db::orders::NewOrder;
use crate::error::ServiceResult;

#[async_trait]
pub trait PosStore: Send + Sync + 'static {
    async fn find_table(&self, id: i64) -> ServiceResult<Option<DiningTable>>;
    async fn update_table(
        &self,
        id: i64,
        patch: &DiningTableUpdate,
    ) -> ServiceResult<Option<DiningTable>>;

    async fn find_order(&self, id: i64) -> ServiceResult<Option<Order>>;
    async fn create_order(&self, data: &NewOrder) -> ServiceResult<Order>;
    async fn update_order(&self, id: i64, patch: &OrderUpdate) -> ServiceResult<Option<Order>>;
    /// Atomically add to `total_amount` and return the updated row
    async fn add_to_order_total(&self, id: i64, amount: Decimal) -> ServiceResult<Option<Order>>;
    async fn count_active_orders_for_table(&self, table_id: i64) -> ServiceResult<i64>;

    async fn find_menu_item(&self, id: i64) -> ServiceResult<Option<MenuItem>>;

    async fn find_order_item(&self, id: i64) -> ServiceResult<Option<OrderItem>>;
    async fn create_order_item(&self, data: &NewOrderItem) -> ServiceResult<OrderItem>;
    async fn update_order_item(
        &self,
        id: i64,
        patch: &OrderItemUpdate,
    ) -> ServiceResult<Option<OrderItem>>;

    /// Fold a completed order into the tenant's daily stats row
    async fn record_sale(
        &self,
        tenant_id: i64,
        day: i64,
        amount: Decimal,
        customers: i32,
    ) -> ServiceResult<Stat>;
}
