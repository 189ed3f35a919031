use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::live::LiveMessage;
use shared::models::{
    DiningTable, DiningTableUpdate, Order, OrderCreate, OrderItem, OrderItemCreate,
    OrderItemUpdate, OrderStatus, OrderUpdate, TableStatus,
};
use shared::money;
use shared::util::{day_start_millis, now_millis};
use std::sync::Arc;

use super::rules;
use crate::db::order_items::NewOrderItem;
use crate::db::orders::NewOrder;
use crate::error::{ServiceResult, require};
use crate::live::Fanout;
use crate::store::PosStore;

/// Persist-then-broadcast funnel for orders, order items and table status.
///
/// Each broadcast follows the write it describes and carries the row as
/// returned by that write. A failed write returns an error and nothing is sent.
pub struct OrderService<S, F> {
    store: Arc<S>,
    fanout: F,
}

impl<S, F: Clone> Clone for OrderService<S, F> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            fanout: self.fanout.clone(),
        }
    }
}

fn ensure_tenant(owner: i64, actor: i64) -> ServiceResult<()> {
    if owner != actor {
        tracing::warn!(owner, actor, "Cross-tenant mutation rejected");
        return Err(AppError::tenant_mismatch().into());
    }
    Ok(())
}

impl<S: PosStore, F: Fanout> OrderService<S, F> {
    pub fn new(store: Arc<S>, fanout: F) -> Self {
        Self { store, fanout }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn publish(&self, tenant_id: i64, msg: LiveMessage) {
        self.fanout.broadcast(tenant_id, msg);
    }

    async fn load_table(&self, tenant_id: i64, table_id: i64) -> ServiceResult<DiningTable> {
        let table = require(
            self.store.find_table(table_id).await?,
            ErrorCode::TableNotFound,
        )?;
        ensure_tenant(table.tenant_id, tenant_id)?;
        Ok(table)
    }

    async fn load_order(&self, tenant_id: i64, order_id: i64) -> ServiceResult<Order> {
        let order = require(
            self.store.find_order(order_id).await?,
            ErrorCode::OrderNotFound,
        )?;
        ensure_tenant(order.tenant_id, tenant_id)?;
        Ok(order)
    }

    async fn write_table(&self, table_id: i64, patch: &DiningTableUpdate) -> ServiceResult<DiningTable> {
        let table = require(
            self.store.update_table(table_id, patch).await?,
            ErrorCode::TableNotFound,
        )?;
        self.publish(
            table.tenant_id,
            LiveMessage::TableUpdated {
                table: table.clone(),
            },
        );
        Ok(table)
    }

    /// Live `table_update` and floor-plan clicks. Always broadcasts, even when
    /// the status did not change.
    pub async fn set_table_status(
        &self,
        tenant_id: i64,
        table_id: i64,
        status: TableStatus,
    ) -> ServiceResult<DiningTable> {
        self.update_table(tenant_id, table_id, &DiningTableUpdate::status(status))
            .await
    }

    /// `PATCH /api/tables/{id}`
    pub async fn update_table(
        &self,
        tenant_id: i64,
        table_id: i64,
        patch: &DiningTableUpdate,
    ) -> ServiceResult<DiningTable> {
        self.load_table(tenant_id, table_id).await?;
        if let Some(capacity) = patch.capacity
            && capacity < 1
        {
            return Err(AppError::validation("capacity must be at least 1").into());
        }
        let table = self.write_table(table_id, patch).await?;
        tracing::debug!(tenant_id, table_id, status = %table.status, "Table updated");
        Ok(table)
    }

    /// Open an order on a table and mark the table occupied
    pub async fn open_order(
        &self,
        tenant_id: i64,
        user_id: i64,
        data: &OrderCreate,
    ) -> ServiceResult<Order> {
        let table = self.load_table(tenant_id, data.table_id).await?;
        let customer_count = data.customer_count.unwrap_or(1);
        if customer_count < 1 {
            return Err(AppError::validation("customerCount must be at least 1").into());
        }

        let order = self
            .store
            .create_order(&NewOrder {
                tenant_id,
                table_id: Some(table.id),
                user_id: data.user_id.unwrap_or(user_id),
                customer_count,
                start_time: now_millis(),
            })
            .await?;
        self.publish(
            tenant_id,
            LiveMessage::OrderUpdated {
                order: order.clone(),
            },
        );
        tracing::info!(tenant_id, order_id = order.id, table_id = table.id, "Order opened");

        self.write_table(table.id, &DiningTableUpdate::status(TableStatus::Occupied))
            .await?;
        Ok(order)
    }

    /// `PATCH /api/orders/{id}` and live `order_update`
    pub async fn update_order(
        &self,
        tenant_id: i64,
        order_id: i64,
        patch: OrderUpdate,
    ) -> ServiceResult<Order> {
        let current = self.load_order(tenant_id, order_id).await?;
        let now = now_millis();

        let mut patch = patch;
        if let Some(total) = patch.total_amount {
            rules::validate_price(total)?;
            patch.total_amount = Some(money::to_money(total));
        }
        if let Some(count) = patch.customer_count
            && count < 1
        {
            return Err(AppError::validation("customerCount must be at least 1").into());
        }
        patch.end_time = rules::end_time_for(&patch, &current, now);

        let order = require(
            self.store.update_order(order_id, &patch).await?,
            ErrorCode::OrderNotFound,
        )?;
        self.publish(
            tenant_id,
            LiveMessage::OrderUpdated {
                order: order.clone(),
            },
        );

        if order.status != current.status {
            tracing::info!(
                tenant_id,
                order_id,
                from = %current.status,
                to = %order.status,
                "Order status changed"
            );
        }
        if current.status != OrderStatus::Completed && order.status == OrderStatus::Completed {
            self.record_sale(&order, now).await;
        }

        if let Some(table_id) = order.table_id {
            self.sync_table_after_order(&patch, &order, table_id).await?;
        }
        Ok(order)
    }

    async fn sync_table_after_order(
        &self,
        patch: &OrderUpdate,
        order: &Order,
        table_id: i64,
    ) -> ServiceResult<()> {
        let other_active = match patch.status {
            Some(status) if status.is_terminal() => {
                self.store.count_active_orders_for_table(table_id).await?
            }
            _ => 0,
        };
        let Some(target) = rules::table_status_after_update(patch, order, other_active) else {
            return Ok(());
        };
        let Some(table) = self.store.find_table(table_id).await? else {
            tracing::warn!(order_id = order.id, table_id, "Order references a missing table");
            return Ok(());
        };
        if table.status != target {
            self.write_table(table_id, &DiningTableUpdate::status(target))
                .await?;
        }
        Ok(())
    }

    /// Stats are derived data; a failure here must not undo the committed order
    async fn record_sale(&self, order: &Order, now: i64) {
        if let Err(e) = self
            .store
            .record_sale(
                order.tenant_id,
                day_start_millis(now),
                order.total_amount,
                order.customer_count,
            )
            .await
        {
            tracing::error!(order_id = order.id, error = %e, "Failed to record daily stat");
        }
    }

    /// `POST /api/orders/{orderId}/items`
    pub async fn add_order_item(
        &self,
        tenant_id: i64,
        order_id: i64,
        data: &OrderItemCreate,
    ) -> ServiceResult<OrderItem> {
        let order = self.load_order(tenant_id, order_id).await?;
        rules::ensure_open(&order)?;
        rules::validate_quantity(data.quantity)?;

        let menu_item = require(
            self.store.find_menu_item(data.menu_item_id).await?,
            ErrorCode::MenuItemNotFound,
        )?;
        ensure_tenant(menu_item.tenant_id, tenant_id)?;
        if !menu_item.is_available {
            return Err(AppError::new(ErrorCode::MenuItemUnavailable)
                .with_detail("menuItemId", menu_item.id)
                .into());
        }

        let unit_price = money::to_money(data.unit_price.unwrap_or(menu_item.price));
        rules::validate_price(unit_price)?;

        let item = self
            .store
            .create_order_item(&NewOrderItem {
                order_id,
                menu_item_id: menu_item.id,
                quantity: data.quantity,
                unit_price,
                notes: data.notes.clone(),
                created_at: now_millis(),
            })
            .await?;
        self.publish(
            tenant_id,
            LiveMessage::OrderItemUpdated {
                order_item: item.clone(),
            },
        );

        self.adjust_total(tenant_id, order_id, money::line_total(unit_price, data.quantity))
            .await?;
        Ok(item)
    }

    /// `PATCH /api/order-items/{id}` and live `order_item_update`
    pub async fn update_order_item(
        &self,
        tenant_id: i64,
        item_id: i64,
        patch: &OrderItemUpdate,
    ) -> ServiceResult<OrderItem> {
        let current = require(
            self.store.find_order_item(item_id).await?,
            ErrorCode::OrderItemNotFound,
        )?;
        let order = self.load_order(tenant_id, current.order_id).await?;
        if let Some(quantity) = patch.quantity {
            rules::validate_quantity(quantity)?;
        }

        let item = require(
            self.store.update_order_item(item_id, patch).await?,
            ErrorCode::OrderItemNotFound,
        )?;
        self.publish(
            tenant_id,
            LiveMessage::OrderItemUpdated {
                order_item: item.clone(),
            },
        );

        let delta = item.quantity - current.quantity;
        if delta != 0 {
            self.adjust_total(tenant_id, order.id, money::line_total(item.unit_price, delta))
                .await?;
        }
        Ok(item)
    }

    async fn adjust_total(&self, tenant_id: i64, order_id: i64, amount: Decimal) -> ServiceResult<Order> {
        let order = require(
            self.store.add_to_order_total(order_id, amount).await?,
            ErrorCode::OrderNotFound,
        )?;
        self.publish(
            tenant_id,
            LiveMessage::OrderUpdated {
                order: order.clone(),
            },
        );
        Ok(order)
    }
}
