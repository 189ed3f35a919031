//! Category Model

use serde::{Deserialize, Serialize};

/// Menu category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub name: String,
    pub image: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
