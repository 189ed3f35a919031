//! Area Model

use serde::{Deserialize, Serialize};

/// Seating area (indoor, terrace, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub is_active: bool,
}

/// Create area payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCreate {
    pub name: String,
    pub is_active: Option<bool>,
}
