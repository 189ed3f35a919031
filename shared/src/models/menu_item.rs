//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub tenant_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    /// Minutes
    pub preparation_time: Option<i32>,
    pub is_available: bool,
    pub is_active: bool,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    pub preparation_time: Option<i32>,
    pub is_available: Option<bool>,
    pub is_active: Option<bool>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<Decimal>,
    pub preparation_time: Option<i32>,
    pub is_available: Option<bool>,
    pub is_active: Option<bool>,
}

/// `{id, name, price}` reference embedded in order item rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemSummary {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
}

impl From<&MenuItem> for MenuItemSummary {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
        }
    }
}
