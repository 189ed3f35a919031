//! Dashboard aggregate

use super::dining_table::{DiningTable, TableSummary};
use super::order::Order;
use super::order_item::OrderItemDetail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Active order with its table, items and elapsed minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub table: TableSummary,
    pub items: Vec<OrderItemDetail>,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularItem {
    pub id: i64,
    pub name: String,
    pub count: i64,
}

/// `GET /api/tenants/{tid}/dashboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub daily_revenue: Decimal,
    pub customer_count: i32,
    pub average_check: Decimal,
    pub occupancy_rate: Decimal,
    pub tables: Vec<DiningTable>,
    pub active_orders: Vec<ActiveOrderDetail>,
    pub popular_items: Vec<PopularItem>,
}
