//! Daily Stat Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-tenant daily statistics row; `date` is the UTC midnight of the day in millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    pub id: i64,
    pub tenant_id: i64,
    pub date: i64,
    pub daily_revenue: Decimal,
    pub customer_count: i32,
    pub average_check: Decimal,
    pub occupancy_rate: Decimal,
}

pub const DEFAULT_STATS_DAYS: i64 = 7;

/// Query string for `GET /api/tenants/{tid}/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i64>,
}

impl StatsQuery {
    /// Requested window, falling back to a week for missing or non-positive values
    pub fn days(&self) -> i64 {
        match self.days {
            Some(d) if d > 0 => d,
            _ => DEFAULT_STATS_DAYS,
        }
    }
}
