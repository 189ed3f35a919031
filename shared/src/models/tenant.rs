//! Tenant Model

use serde::{Deserialize, Serialize};

pub const DEFAULT_THEME_COLOR: &str = "#4F46E5";

/// Tenant entity (one restaurant account)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub theme_color: Option<String>,
    pub created_at: i64,
}

/// Create tenant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCreate {
    pub name: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub theme_color: Option<String>,
}
