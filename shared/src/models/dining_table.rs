//! Dining Table Model

use super::status::TableStatus;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_CAPACITY: i32 = 4;

/// Dining table entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    pub tenant_id: i64,
    pub area_id: i64,
    pub name: String,
    pub capacity: i32,
    /// Floor-plan coordinates
    pub pos_x: i32,
    pub pos_y: i32,
    pub status: TableStatus,
    pub is_active: bool,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub area_id: i64,
    pub name: String,
    pub capacity: Option<i32>,
    pub pos_x: Option<i32>,
    pub pos_y: Option<i32>,
    pub status: Option<TableStatus>,
    pub is_active: Option<bool>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    pub area_id: Option<i64>,
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub pos_x: Option<i32>,
    pub pos_y: Option<i32>,
    pub status: Option<TableStatus>,
    pub is_active: Option<bool>,
}

impl DiningTableUpdate {
    pub fn status(status: TableStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Apply the present fields onto `table`
    pub fn apply_to(&self, table: &mut DiningTable) {
        if let Some(v) = self.area_id {
            table.area_id = v;
        }
        if let Some(v) = &self.name {
            table.name = v.clone();
        }
        if let Some(v) = self.capacity {
            table.capacity = v;
        }
        if let Some(v) = self.pos_x {
            table.pos_x = v;
        }
        if let Some(v) = self.pos_y {
            table.pos_y = v;
        }
        if let Some(v) = self.status {
            table.status = v;
        }
        if let Some(v) = self.is_active {
            table.is_active = v;
        }
    }
}

/// `{id, name}` reference embedded in dashboard rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_json_shape() {
        let table = DiningTable {
            id: 3,
            tenant_id: 1,
            area_id: 2,
            name: "T3".into(),
            capacity: 4,
            pos_x: 10,
            pos_y: 20,
            status: TableStatus::BillRequested,
            is_active: true,
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["areaId"], 2);
        assert_eq!(json["posX"], 10);
        assert_eq!(json["status"], "bill_requested");
    }

    #[test]
    fn test_update_rejects_unknown_status() {
        let res = serde_json::from_str::<DiningTableUpdate>(r#"{"status":"dirty"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut table = DiningTable {
            id: 1,
            tenant_id: 1,
            area_id: 1,
            name: "T1".into(),
            capacity: 4,
            pos_x: 0,
            pos_y: 0,
            status: TableStatus::Empty,
            is_active: true,
        };
        let patch: DiningTableUpdate =
            serde_json::from_str(r#"{"capacity":6,"status":"occupied"}"#).unwrap();
        patch.apply_to(&mut table);
        assert_eq!(table.capacity, 6);
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(table.name, "T1");
    }
}
