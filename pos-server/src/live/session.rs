//! Live WebSocket endpoint
//!
//! GET /ws (session cookie required at upgrade)
//!
//! 协议:
//! - Client → Server: LiveCommand (auth 必须先于任何变更)
//! - Server → Client: LiveMessage (持久化成功后的完整实体)

use axum::Extension;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shared::error::{AppError, ErrorCode};
use shared::live::{LiveCommand, LiveMessage};
use shared::models::{OrderItemUpdate, OrderUpdate};
use tokio::time::Duration;

use super::{ConnId, Fanout, FanoutHub};
use crate::auth::SessionIdentity;
use crate::orders::OrderService;
use crate::state::AppState;
use crate::store::PosStore;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Result of one inbound frame
#[derive(Debug, PartialEq)]
pub enum CommandOutcome {
    Authenticated,
    /// `auth` for a tenant other than the session's
    AuthRejected,
    /// Mutation from a connection that has not sent `auth` yet
    Unauthenticated,
    Applied,
    Failed(ErrorCode),
}

/// GET /ws
pub async fn handle_live_ws(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| live_session(socket, state, identity))
}

async fn live_session(socket: WebSocket, state: AppState, identity: SessionIdentity) {
    let (mut sink, mut stream) = socket.split();
    let (conn_id, mut outbound) = state.hub.register();

    tracing::info!(conn_id, user_id = identity.user_id, "Live connection opened");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            msg = outbound.recv() => {
                match msg {
                    Some(msg) => {
                        if send_message(&mut sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(cmd) = parse_command(conn_id, &text) {
                            apply_command(&state.hub, &state.orders, conn_id, &identity, cmd).await;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(conn_id, error = %e, "Live socket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.hub.deregister(conn_id);
    tracing::info!(conn_id, "Live connection closed");
}

/// 格式错误的帧只记录日志，连接保持
pub fn parse_command(conn_id: ConnId, text: &str) -> Option<LiveCommand> {
    match serde_json::from_str::<LiveCommand>(text) {
        Ok(cmd) => Some(cmd),
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "Malformed live frame dropped");
            None
        }
    }
}

/// Apply one decoded command on behalf of `conn_id`.
///
/// Mutations go through the same [`OrderService`] calls as the REST handlers,
/// so broadcasts and table side effects are identical on both paths.
pub async fn apply_command<S: PosStore, F: Fanout>(
    hub: &FanoutHub,
    orders: &OrderService<S, F>,
    conn_id: ConnId,
    identity: &SessionIdentity,
    cmd: LiveCommand,
) -> CommandOutcome {
    let kind = cmd.kind();
    let session_tenant = hub.tenant_of(conn_id);

    let result = match (cmd, session_tenant) {
        (LiveCommand::Auth { tenant_id }, _) => {
            if tenant_id != identity.tenant_id {
                tracing::warn!(
                    conn_id,
                    requested = tenant_id,
                    session_tenant = identity.tenant_id,
                    "Live auth rejected: tenant does not match session"
                );
                return CommandOutcome::AuthRejected;
            }
            hub.authenticate(conn_id, tenant_id);
            return CommandOutcome::Authenticated;
        }
        (_, None) => {
            tracing::warn!(conn_id, kind, "Live command before auth dropped");
            return CommandOutcome::Unauthenticated;
        }
        (LiveCommand::TableUpdate { table_id, status }, Some(tenant_id)) => orders
            .set_table_status(tenant_id, table_id, status)
            .await
            .map(|_| ()),
        (LiveCommand::OrderUpdate { order_id, status }, Some(tenant_id)) => orders
            .update_order(tenant_id, order_id, OrderUpdate::status(status))
            .await
            .map(|_| ()),
        (
            LiveCommand::OrderItemUpdate {
                order_item_id,
                status,
            },
            Some(tenant_id),
        ) => orders
            .update_order_item(tenant_id, order_item_id, &OrderItemUpdate::status(status))
            .await
            .map(|_| ()),
    };

    match result {
        Ok(()) => CommandOutcome::Applied,
        Err(e) => {
            let err: AppError = e.into();
            tracing::warn!(
                conn_id,
                tenant_id = ?session_tenant,
                kind,
                code = %err.code,
                "Live command failed: {}",
                err.message
            );
            CommandOutcome::Failed(err.code)
        }
    }
}

async fn send_message(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &LiveMessage,
) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!(kind = msg.kind(), "Failed to serialize live message: {e}");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use shared::models::{OrderCreate, OrderStatus, TableStatus, UserRole};
    use std::sync::Arc;

    fn identity(tenant_id: i64) -> SessionIdentity {
        SessionIdentity {
            user_id: 1,
            tenant_id,
            username: "garson".to_string(),
            role: UserRole::Waiter,
        }
    }

    fn setup() -> (FanoutHub, OrderService<MemoryStore, FanoutHub>, Arc<MemoryStore>) {
        let hub = FanoutHub::new();
        let store = Arc::new(MemoryStore::new());
        store.insert_table(5, 1, TableStatus::Empty);
        store.insert_table(6, 2, TableStatus::Empty);
        let orders = OrderService::new(store.clone(), hub.clone());
        (hub, orders, store)
    }

    fn table_update(table_id: i64, status: TableStatus) -> LiveCommand {
        LiveCommand::TableUpdate { table_id, status }
    }

    #[tokio::test]
    async fn table_update_reaches_every_tenant_connection() {
        let (hub, orders, store) = setup();
        let (sender, mut rx_sender) = hub.register();
        let (peer, mut rx_peer) = hub.register();
        let (other, mut rx_other) = hub.register();
        hub.authenticate(peer, 1);
        hub.authenticate(other, 2);

        let id = identity(1);
        assert_eq!(
            apply_command(&hub, &orders, sender, &id, LiveCommand::Auth { tenant_id: 1 }).await,
            CommandOutcome::Authenticated
        );
        assert_eq!(
            apply_command(&hub, &orders, sender, &id, table_update(5, TableStatus::Occupied)).await,
            CommandOutcome::Applied
        );

        assert_eq!(store.table(5).unwrap().status, TableStatus::Occupied);
        for rx in [&mut rx_sender, &mut rx_peer] {
            match rx.try_recv() {
                Ok(LiveMessage::TableUpdated { table }) => {
                    assert_eq!(table.id, 5);
                    assert_eq!(table.status, TableStatus::Occupied);
                }
                other => panic!("Expected TableUpdated, got {other:?}"),
            }
        }
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn unauthenticated_mutation_is_dropped() {
        let (hub, orders, store) = setup();
        let (anon, _rx_anon) = hub.register();
        let (listener, mut rx) = hub.register();
        hub.authenticate(listener, 1);

        let outcome =
            apply_command(&hub, &orders, anon, &identity(1), table_update(5, TableStatus::Occupied))
                .await;
        assert_eq!(outcome, CommandOutcome::Unauthenticated);
        assert_eq!(store.table(5).unwrap().status, TableStatus::Empty);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn auth_for_foreign_tenant_rejected() {
        let (hub, orders, _) = setup();
        let (conn, _rx) = hub.register();

        let outcome =
            apply_command(&hub, &orders, conn, &identity(1), LiveCommand::Auth { tenant_id: 2 }).await;
        assert_eq!(outcome, CommandOutcome::AuthRejected);
        assert_eq!(hub.tenant_of(conn), None);
    }

    #[tokio::test]
    async fn foreign_table_update_fails_without_broadcast() {
        let (hub, orders, store) = setup();
        let (conn, mut rx) = hub.register();
        hub.authenticate(conn, 1);

        let outcome =
            apply_command(&hub, &orders, conn, &identity(1), table_update(6, TableStatus::Occupied))
                .await;
        assert_eq!(outcome, CommandOutcome::Failed(ErrorCode::TenantMismatch));
        assert_eq!(store.table(6).unwrap().status, TableStatus::Empty);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn live_order_completion_empties_table() {
        let (hub, orders, store) = setup();
        let order = orders
            .open_order(
                1,
                1,
                &OrderCreate {
                    table_id: 5,
                    user_id: None,
                    customer_count: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(store.table(5).unwrap().status, TableStatus::Occupied);

        let (conn, mut rx) = hub.register();
        hub.authenticate(conn, 1);
        let cmd = LiveCommand::OrderUpdate {
            order_id: order.id,
            status: OrderStatus::Completed,
        };
        assert_eq!(
            apply_command(&hub, &orders, conn, &identity(1), cmd).await,
            CommandOutcome::Applied
        );
        assert_eq!(store.table(5).unwrap().status, TableStatus::Empty);

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|m| m.kind())
            .collect();
        assert_eq!(kinds, vec!["order_updated", "table_updated"]);
    }

    #[tokio::test]
    async fn failed_write_is_reported_not_broadcast() {
        let (hub, orders, store) = setup();
        let (conn, mut rx) = hub.register();
        hub.authenticate(conn, 1);
        store.set_fail_writes(true);

        let outcome =
            apply_command(&hub, &orders, conn, &identity(1), table_update(5, TableStatus::Occupied))
                .await;
        assert_eq!(outcome, CommandOutcome::Failed(ErrorCode::InternalError));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn malformed_frames_are_dropped() {
        assert!(parse_command(1, "not json").is_none());
        assert!(parse_command(1, r#"{"type":"table_update","tableId":5}"#).is_none());
        assert!(parse_command(1, r#"{"type":"table_update","tableId":5,"status":"dirty"}"#).is_none());
        assert_eq!(
            parse_command(1, r#"{"type":"table_update","tableId":"5","status":"occupied"}"#),
            Some(table_update(5, TableStatus::Occupied))
        );
    }
}
