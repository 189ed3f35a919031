//! FanoutHub — 实时连接注册表与租户广播
//!
//! 每个 WebSocket 连接注册一个 mpsc 通道；认证后绑定 tenant。
//! 广播按 tenant 严格隔离，未认证连接既不接收也不触发广播。
//!
//! ```text
//! REST handler / live session
//!       │ OrderService (persist → re-read)
//!       ▼
//! FanoutHub::broadcast(tenant_id, LiveMessage)
//!   └── connections: conn_id → Connection { tenant_id, tx }
//!         │ (线性扫描，tenant 相等才投递)
//!         ▼
//!       writer task → WebSocket sink
//! ```

pub mod session;

use dashmap::DashMap;
use shared::live::LiveMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

pub type ConnId = u64;

/// 每个连接的出站缓冲
const CONNECTION_BUFFER: usize = 64;

/// Broadcast sink used by the mutation funnel
pub trait Fanout: Send + Sync + 'static {
    /// Deliver `msg` to every connection bound to `tenant_id`; returns how many got it
    fn broadcast(&self, tenant_id: i64, msg: LiveMessage) -> usize;
}

struct Connection {
    /// `None` 直到收到有效的 auth 消息
    tenant_id: Option<i64>,
    tx: mpsc::Sender<LiveMessage>,
}

/// 进程内连接表，重启后丢失（不做消息回放）
#[derive(Clone, Default)]
pub struct FanoutHub {
    connections: Arc<DashMap<ConnId, Connection>>,
    next_id: Arc<AtomicU64>,
}

impl FanoutHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新连接：分配 id，返回出站接收端
    pub fn register(&self) -> (ConnId, mpsc::Receiver<LiveMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        self.connections.insert(id, Connection { tenant_id: None, tx });
        tracing::debug!(conn_id = id, "Live connection registered");
        (id, rx)
    }

    /// 绑定 tenant；连接已关闭时返回 false
    pub fn authenticate(&self, conn_id: ConnId, tenant_id: i64) -> bool {
        match self.connections.get_mut(&conn_id) {
            Some(mut conn) => {
                conn.tenant_id = Some(tenant_id);
                tracing::info!(conn_id, tenant_id, "Live connection authenticated");
                true
            }
            None => false,
        }
    }

    pub fn tenant_of(&self, conn_id: ConnId) -> Option<i64> {
        self.connections.get(&conn_id).and_then(|c| c.tenant_id)
    }

    pub fn deregister(&self, conn_id: ConnId) {
        if self.connections.remove(&conn_id).is_some() {
            tracing::debug!(conn_id, "Live connection removed");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 同 tenant 的所有连接（包括发送者）都会收到
    pub fn broadcast(&self, tenant_id: i64, msg: LiveMessage) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            if entry.tenant_id != Some(tenant_id) {
                continue;
            }
            match entry.tx.try_send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        conn_id = *entry.key(),
                        tenant_id,
                        kind = msg.kind(),
                        "Live connection buffer full, message dropped"
                    );
                }
                // writer 已退出，连接即将 deregister
                Err(TrySendError::Closed(_)) => {}
            }
        }
        tracing::debug!(tenant_id, kind = msg.kind(), delivered, "Live broadcast");
        delivered
    }
}

impl Fanout for FanoutHub {
    fn broadcast(&self, tenant_id: i64, msg: LiveMessage) -> usize {
        FanoutHub::broadcast(self, tenant_id, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DiningTable, TableStatus};

    fn table_msg(tenant_id: i64, id: i64) -> LiveMessage {
        LiveMessage::TableUpdated {
            table: DiningTable {
                id,
                tenant_id,
                area_id: 1,
                name: format!("Masa {id}"),
                capacity: 4,
                pos_x: 0,
                pos_y: 0,
                status: TableStatus::Occupied,
                is_active: true,
            },
        }
    }

    #[tokio::test]
    async fn tenant_isolation() {
        let hub = FanoutHub::new();
        let (a, mut rx_a) = hub.register();
        let (b, mut rx_b) = hub.register();
        hub.authenticate(a, 1);
        hub.authenticate(b, 2);

        assert_eq!(hub.broadcast(1, table_msg(1, 10)), 1);

        match rx_a.recv().await.unwrap() {
            LiveMessage::TableUpdated { table } => assert_eq!(table.id, 10),
            other => panic!("Expected TableUpdated, got {other:?}"),
        }
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn unauthenticated_connection_receives_nothing() {
        let hub = FanoutHub::new();
        let (_anon, mut rx) = hub.register();
        let (auth, _rx_auth) = hub.register();
        hub.authenticate(auth, 1);

        assert_eq!(hub.broadcast(1, table_msg(1, 3)), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn sender_also_receives_broadcast() {
        let hub = FanoutHub::new();
        let (a, mut rx_a) = hub.register();
        let (b, mut rx_b) = hub.register();
        hub.authenticate(a, 7);
        hub.authenticate(b, 7);

        assert_eq!(hub.broadcast(7, table_msg(7, 1)), 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[test]
    fn deregister_and_count() {
        let hub = FanoutHub::new();
        let (a, _rx_a) = hub.register();
        let (b, _rx_b) = hub.register();
        assert_ne!(a, b);
        assert_eq!(hub.connection_count(), 2);

        hub.authenticate(a, 1);
        assert_eq!(hub.tenant_of(a), Some(1));
        assert_eq!(hub.tenant_of(b), None);

        hub.deregister(a);
        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.tenant_of(a), None);
        assert!(!hub.authenticate(a, 1));
        assert_eq!(hub.broadcast(1, table_msg(1, 1)), 0);
    }

    #[test]
    fn closed_receiver_is_skipped() {
        let hub = FanoutHub::new();
        let (a, rx_a) = hub.register();
        hub.authenticate(a, 1);
        drop(rx_a);
        assert_eq!(hub.broadcast(1, table_msg(1, 1)), 0);
    }

    #[test]
    fn full_buffer_drops_without_blocking() {
        let hub = FanoutHub::new();
        let (a, _rx_a) = hub.register();
        hub.authenticate(a, 1);
        for _ in 0..CONNECTION_BUFFER {
            assert_eq!(hub.broadcast(1, table_msg(1, 1)), 1);
        }
        assert_eq!(hub.broadcast(1, table_msg(1, 1)), 0);
    }
}
