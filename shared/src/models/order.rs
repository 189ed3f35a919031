//! Order Model

use super::status::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order entity
///
/// `total_amount` is maintained server-side from the order's items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub tenant_id: i64,
    /// None for take-away orders
    pub table_id: Option<i64>,
    pub user_id: i64,
    pub status: OrderStatus,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub total_amount: Decimal,
    pub is_paid: bool,
    pub payment_method: Option<String>,
    pub customer_count: i32,
}

/// Open order payload (`POST /api/tenants/{tid}/orders`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub table_id: i64,
    /// Defaults to the session user
    pub user_id: Option<i64>,
    pub customer_count: Option<i32>,
}

/// Update order payload (`PATCH /api/orders/{id}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub end_time: Option<i64>,
    pub total_amount: Option<Decimal>,
    pub is_paid: Option<bool>,
    pub payment_method: Option<String>,
    pub customer_count: Option<i32>,
}

impl OrderUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, order: &mut Order) {
        if let Some(v) = self.status {
            order.status = v;
        }
        if let Some(v) = self.end_time {
            order.end_time = Some(v);
        }
        if let Some(v) = self.total_amount {
            order.total_amount = v;
        }
        if let Some(v) = self.is_paid {
            order.is_paid = v;
        }
        if let Some(v) = &self.payment_method {
            order.payment_method = Some(v.clone());
        }
        if let Some(v) = self.customer_count {
            order.customer_count = v;
        }
    }
}

/// Query string for `GET /api/tenants/{tid}/orders`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub active: bool,
}
