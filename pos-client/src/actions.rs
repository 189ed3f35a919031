//! Screen-level operations
//!
//! Writes go through the Resource API and are followed by an eager refetch of
//! the affected collections. Table status clicks are patched optimistically
//! and sent over the live channel when it is up.

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::models::{
    DiningTable, Order, OrderCreate, OrderItem, OrderItemCreate, OrderItemStatus, OrderStatus,
    TableStatus,
};

use crate::cache::{KeyFilter, QueryClient, QueryFetcher, QueryKey, UnauthorizedBehavior};
use crate::{ClientError, ClientResult, LiveClient};

/// Mutating half of the Resource API
#[async_trait]
pub trait MutationApi: Send + Sync {
    async fn post_value(&self, path: &str, body: Value) -> ClientResult<Value>;
    async fn patch_value(&self, path: &str, body: Value) -> ClientResult<Value>;
}

pub struct PosActions<F> {
    queries: QueryClient<F>,
    live: Option<LiveClient>,
    tenant_id: i64,
}

impl<F: QueryFetcher + MutationApi> PosActions<F> {
    pub fn new(queries: QueryClient<F>, tenant_id: i64) -> Self {
        Self {
            queries,
            live: None,
            tenant_id,
        }
    }

    pub fn with_live(mut self, live: LiveClient) -> Self {
        self.live = Some(live);
        self
    }

    pub fn set_live(&mut self, live: Option<LiveClient>) {
        self.live = live;
    }

    pub fn queries(&self) -> &QueryClient<F> {
        &self.queries
    }

    pub fn tenant_id(&self) -> i64 {
        self.tenant_id
    }

    fn tables_key(&self) -> QueryKey {
        QueryKey::tenant(self.tenant_id, "tables")
    }

    fn table_filters(&self) -> Vec<KeyFilter> {
        vec![
            KeyFilter::Exact(self.tables_key()),
            KeyFilter::prefix("/api/areas"),
            KeyFilter::Exact(QueryKey::tenant(self.tenant_id, "dashboard")),
        ]
    }

    fn order_filters(&self) -> Vec<KeyFilter> {
        vec![
            KeyFilter::prefix(format!("/api/tenants/{}/orders", self.tenant_id)),
            KeyFilter::prefix("/api/tables"),
            KeyFilter::Exact(QueryKey::tenant(self.tenant_id, "dashboard")),
        ]
    }

    /// Refetch failures are logged; the write itself already succeeded
    async fn refresh(&self, filters: Vec<KeyFilter>) {
        for filter in &filters {
            if let Err(e) = self.queries.invalidate_and_refetch(filter).await {
                tracing::warn!(error = %e, "Refetch after write failed");
            }
        }
    }

    /// Advance a table along empty → occupied → bill_requested → empty.
    ///
    /// The cached tables list is patched before the server answers. With a
    /// live channel the change goes out as `table_update` and the broadcast
    /// confirms it; otherwise it is a REST PATCH followed by a refetch. A
    /// failed REST write refetches so the optimistic value is rolled back.
    pub async fn cycle_table_status(&self, table_id: i64) -> ClientResult<TableStatus> {
        let key = self.tables_key();
        let tables: Vec<DiningTable> = self
            .queries
            .query(&key, UnauthorizedBehavior::Throw)
            .await?
            .unwrap_or_default();
        let current = tables
            .iter()
            .find(|t| t.id == table_id)
            .ok_or_else(|| ClientError::NotFound(format!("table {table_id}")))?;
        let next = current.status.next();

        self.queries
            .cache()
            .set_query_data(key, |cached: Option<Vec<DiningTable>>| {
                cached
                    .unwrap_or_else(|| tables.clone())
                    .into_iter()
                    .map(|mut t| {
                        if t.id == table_id {
                            t.status = next;
                        }
                        t
                    })
                    .collect()
            })?;

        if let Some(live) = self.live.as_ref().filter(|l| l.is_connected()) {
            match live.update_table_status(table_id, next).await {
                Ok(()) => return Ok(next),
                Err(e) => tracing::warn!(table_id, error = %e, "Live send failed, using REST"),
            }
        }

        let result = self
            .queries
            .fetcher()
            .patch_value(&format!("/api/tables/{table_id}"), json!({ "status": next }))
            .await;
        self.refresh(self.table_filters()).await;
        result?;
        Ok(next)
    }

    pub async fn open_order(&self, table_id: i64, customer_count: Option<i32>) -> ClientResult<Order> {
        let body = serde_json::to_value(OrderCreate {
            table_id,
            user_id: None,
            customer_count,
        })?;
        let value = self
            .queries
            .fetcher()
            .post_value(&format!("/api/tenants/{}/orders", self.tenant_id), body)
            .await?;
        let order: Order = serde_json::from_value(value)?;

        let mut filters = self.order_filters();
        filters.extend(self.table_filters());
        self.refresh(filters).await;
        Ok(order)
    }

    pub async fn add_order_item(&self, order_id: i64, item: OrderItemCreate) -> ClientResult<OrderItem> {
        let value = self
            .queries
            .fetcher()
            .post_value(
                &format!("/api/orders/{order_id}/items"),
                serde_json::to_value(item)?,
            )
            .await?;
        let created: OrderItem = serde_json::from_value(value)?;

        let mut filters = vec![KeyFilter::Exact(QueryKey::new(format!(
            "/api/orders/{order_id}/items"
        )))];
        filters.extend(self.order_filters());
        self.refresh(filters).await;
        Ok(created)
    }

    pub async fn set_order_status(&self, order_id: i64, status: OrderStatus) -> ClientResult<Order> {
        let value = self
            .queries
            .fetcher()
            .patch_value(&format!("/api/orders/{order_id}"), json!({ "status": status }))
            .await?;
        let order: Order = serde_json::from_value(value)?;

        let mut filters = self.order_filters();
        filters.extend(self.table_filters());
        self.refresh(filters).await;
        Ok(order)
    }

    pub async fn set_order_item_status(
        &self,
        order_item_id: i64,
        status: OrderItemStatus,
    ) -> ClientResult<OrderItem> {
        let value = self
            .queries
            .fetcher()
            .patch_value(
                &format!("/api/order-items/{order_item_id}"),
                json!({ "status": status }),
            )
            .await?;
        let item: OrderItem = serde_json::from_value(value)?;

        self.refresh(vec![KeyFilter::Exact(QueryKey::new(format!(
            "/api/orders/{}/items",
            item.order_id
        )))])
        .await;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EntryState;
    use crate::testing::{ScriptedBackend, order_json, table};
    use shared::live::LiveCommand;
    use tokio::sync::mpsc;

    fn actions(backend: &ScriptedBackend) -> PosActions<ScriptedBackend> {
        PosActions::new(QueryClient::new(backend.clone()), 1)
    }

    fn seed_tables(actions: &PosActions<ScriptedBackend>) {
        actions
            .queries()
            .cache()
            .set_fresh(
                QueryKey::tenant(1, "tables"),
                &vec![table(5, TableStatus::Empty), table(6, TableStatus::Occupied)],
            )
            .unwrap();
    }

    #[tokio::test]
    async fn cycle_over_live_patches_optimistically() {
        let backend = ScriptedBackend::new();
        let (tx, mut rx) = mpsc::channel(4);
        let actions = actions(&backend).with_live(LiveClient::from_sender(tx));
        seed_tables(&actions);

        let next = actions.cycle_table_status(5).await.unwrap();
        assert_eq!(next, TableStatus::Occupied);

        let key = QueryKey::tenant(1, "tables");
        assert_eq!(actions.queries().cache().state(&key), Some(EntryState::Optimistic));
        let tables: Vec<DiningTable> = actions.queries().cache().get(&key).unwrap();
        assert_eq!(tables[0].status, TableStatus::Occupied);
        assert_eq!(tables[1].status, TableStatus::Occupied);

        match rx.recv().await {
            Some(LiveCommand::TableUpdate { table_id, status }) => {
                assert_eq!(table_id, 5);
                assert_eq!(status, TableStatus::Occupied);
            }
            other => panic!("Expected TableUpdate, got {other:?}"),
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn unconfirmed_live_cycle_is_refetched_on_next_read() {
        let backend = ScriptedBackend::new();
        let (tx, mut rx) = mpsc::channel(4);
        let actions = actions(&backend).with_live(LiveClient::from_sender(tx));
        seed_tables(&actions);

        actions.cycle_table_status(5).await.unwrap();
        assert!(rx.recv().await.is_some());
        // the server rejected the command: no broadcast follows
        drop(rx);
        backend.respond(
            "/api/tenants/1/tables",
            serde_json::to_value(vec![table(5, TableStatus::Empty), table(6, TableStatus::Occupied)])
                .unwrap(),
        );

        let key = QueryKey::tenant(1, "tables");
        let tables: Vec<DiningTable> = actions
            .queries()
            .query(&key, UnauthorizedBehavior::Throw)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tables[0].status, TableStatus::Empty);
        assert_eq!(backend.calls(), vec!["/api/tenants/1/tables"]);
        assert_eq!(actions.queries().cache().state(&key), Some(EntryState::Fresh));
    }

    #[tokio::test]
    async fn confirmed_live_cycle_is_served_from_cache() {
        let backend = ScriptedBackend::new();
        let (tx, _rx) = mpsc::channel(4);
        let actions = actions(&backend).with_live(LiveClient::from_sender(tx));
        seed_tables(&actions);

        actions.cycle_table_status(5).await.unwrap();
        actions
            .queries()
            .apply_live(&shared::live::LiveMessage::TableUpdated {
                table: table(5, TableStatus::Occupied),
            })
            .unwrap();

        let key = QueryKey::tenant(1, "tables");
        assert_eq!(actions.queries().cache().state(&key), Some(EntryState::Fresh));
        let tables: Vec<DiningTable> = actions
            .queries()
            .query(&key, UnauthorizedBehavior::Throw)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tables[0].status, TableStatus::Occupied);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn cycle_without_live_falls_back_to_rest() {
        let backend = ScriptedBackend::new();
        let actions = actions(&backend);
        seed_tables(&actions);
        backend.respond(
            "PATCH /api/tables/6",
            serde_json::to_value(table(6, TableStatus::BillRequested)).unwrap(),
        );
        backend.respond(
            "/api/tenants/1/tables",
            serde_json::to_value(vec![
                table(5, TableStatus::Empty),
                table(6, TableStatus::BillRequested),
            ])
            .unwrap(),
        );

        let next = actions.cycle_table_status(6).await.unwrap();
        assert_eq!(next, TableStatus::BillRequested);
        assert_eq!(
            backend.calls(),
            vec!["PATCH /api/tables/6", "/api/tenants/1/tables"]
        );
        let key = QueryKey::tenant(1, "tables");
        assert_eq!(actions.queries().cache().state(&key), Some(EntryState::Fresh));
    }

    #[tokio::test]
    async fn failed_rest_cycle_rolls_back() {
        let backend = ScriptedBackend::new();
        let actions = actions(&backend);
        seed_tables(&actions);
        backend.respond_err(
            "PATCH /api/tables/5",
            ClientError::Forbidden("Tenant mismatch".into()),
        );
        backend.respond(
            "/api/tenants/1/tables",
            serde_json::to_value(vec![table(5, TableStatus::Empty)]).unwrap(),
        );

        let err = actions.cycle_table_status(5).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(_)));
        let tables: Vec<DiningTable> = actions
            .queries()
            .cache()
            .get(&QueryKey::tenant(1, "tables"))
            .unwrap();
        assert_eq!(tables[0].status, TableStatus::Empty);
    }

    #[tokio::test]
    async fn cycle_unknown_table_is_not_found() {
        let backend = ScriptedBackend::new();
        let actions = actions(&backend);
        seed_tables(&actions);
        assert!(matches!(
            actions.cycle_table_status(99).await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn open_order_refetches_orders_and_tables() {
        let backend = ScriptedBackend::new();
        let actions = actions(&backend);
        seed_tables(&actions);
        let active = QueryKey::tenant(1, "orders").with_param("active", true);
        actions.queries().cache().set_fresh(active.clone(), &json!([])).unwrap();

        backend.respond("POST /api/tenants/1/orders", order_json(3, OrderStatus::Active));
        backend.respond("/api/tenants/1/orders?active=true", json!([order_json(3, OrderStatus::Active)]));
        backend.respond(
            "/api/tenants/1/tables",
            serde_json::to_value(vec![table(5, TableStatus::Occupied)]).unwrap(),
        );

        let order = actions.open_order(5, Some(2)).await.unwrap();
        assert_eq!(order.id, 3);
        assert_eq!(actions.queries().cache().get_value(&active).unwrap()[0]["id"], 3);
        let tables: Vec<DiningTable> = actions
            .queries()
            .cache()
            .get(&QueryKey::tenant(1, "tables"))
            .unwrap();
        assert_eq!(tables[0].status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn refetch_failure_does_not_fail_write() {
        let backend = ScriptedBackend::new();
        let actions = actions(&backend);
        let active = QueryKey::tenant(1, "orders").with_param("active", true);
        actions.queries().cache().set_fresh(active.clone(), &json!([])).unwrap();
        backend.respond("PATCH /api/orders/3", order_json(3, OrderStatus::Completed));

        let order = actions.set_order_status(3, OrderStatus::Completed).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(actions.queries().cache().state(&active), Some(EntryState::Stale));
    }

    #[tokio::test]
    async fn write_error_surfaces_server_message() {
        let backend = ScriptedBackend::new();
        let actions = actions(&backend);
        backend.respond_err(
            "POST /api/orders/3/items",
            ClientError::Conflict("Order already completed".into()),
        );
        let err = actions
            .add_order_item(
                3,
                OrderItemCreate {
                    menu_item_id: 1,
                    quantity: 1,
                    unit_price: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Conflict(m) if m == "Order already completed"));
    }

    #[tokio::test]
    async fn item_status_refetches_its_order_items() {
        let backend = ScriptedBackend::new();
        let actions = actions(&backend);
        let items = QueryKey::new("/api/orders/3/items");
        actions.queries().cache().set_fresh(items.clone(), &json!([])).unwrap();
        backend.respond(
            "PATCH /api/order-items/11",
            json!({
                "id": 11, "orderId": 3, "menuItemId": 1, "quantity": 1,
                "unitPrice": "50.00", "status": "served", "notes": null, "createdAt": 0
            }),
        );
        backend.respond("/api/orders/3/items", json!([{"id": 11, "status": "served"}]));

        let item = actions
            .set_order_item_status(11, OrderItemStatus::Served)
            .await
            .unwrap();
        assert_eq!(item.status, OrderItemStatus::Served);
        assert_eq!(actions.queries().cache().get_value(&items).unwrap()[0]["status"], "served");
    }
}
