//! Live channel protocol
//!
//! Browser/client → server: [`LiveCommand`] (认证 + 变更意图)
//! Server → client: [`LiveMessage`] (变更后的完整实体)
//!
//! JSON text frames, `{type, ...fields}` envelope.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{DiningTable, Order, OrderItem, OrderItemStatus, OrderStatus, TableStatus};

/// Client → server 命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LiveCommand {
    /// 绑定租户，必须是第一条有效消息
    Auth {
        #[serde(deserialize_with = "de_id")]
        tenant_id: i64,
    },
    TableUpdate {
        #[serde(deserialize_with = "de_id")]
        table_id: i64,
        status: TableStatus,
    },
    OrderUpdate {
        #[serde(deserialize_with = "de_id")]
        order_id: i64,
        status: OrderStatus,
    },
    OrderItemUpdate {
        #[serde(deserialize_with = "de_id")]
        order_item_id: i64,
        status: OrderItemStatus,
    },
}

impl LiveCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            LiveCommand::Auth { .. } => "auth",
            LiveCommand::TableUpdate { .. } => "table_update",
            LiveCommand::OrderUpdate { .. } => "order_update",
            LiveCommand::OrderItemUpdate { .. } => "order_item_update",
        }
    }
}

/// Server → client 推送，携带最后一次持久化后的实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LiveMessage {
    TableUpdated { table: DiningTable },
    OrderUpdated { order: Order },
    OrderItemUpdated { order_item: OrderItem },
}

impl LiveMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            LiveMessage::TableUpdated { .. } => "table_updated",
            LiveMessage::OrderUpdated { .. } => "order_updated",
            LiveMessage::OrderItemUpdated { .. } => "order_item_updated",
        }
    }
}

/// 浏览器有时把 id 当字符串发送（表单值），两种都接受
fn de_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(i64),
        Str(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Num(n) => Ok(n),
        RawId::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s:?}"))),
    }
}
