//! Order Item Model

use super::menu_item::MenuItemSummary;
use super::status::OrderItemStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of an order; `unit_price` is snapshotted when the line is added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub status: OrderItemStatus,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Add item payload (`POST /api/orders/{orderId}/items`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemCreate {
    pub menu_item_id: i64,
    pub quantity: i32,
    /// Falls back to the menu item's current price
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Update item payload (`PATCH /api/order-items/{id}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemUpdate {
    pub status: Option<OrderItemStatus>,
    pub quantity: Option<i32>,
    pub notes: Option<String>,
}

impl OrderItemUpdate {
    pub fn status(status: OrderItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, item: &mut OrderItem) {
        if let Some(v) = self.status {
            item.status = v;
        }
        if let Some(v) = self.quantity {
            item.quantity = v;
        }
        if let Some(v) = &self.notes {
            item.notes = Some(v.clone());
        }
    }
}

/// Order item joined with its menu item summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub menu_item: Option<MenuItemSummary>,
}
