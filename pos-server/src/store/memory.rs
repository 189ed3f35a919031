//! In-memory [`PosStore`] for unit tests

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    DiningTable, DiningTableUpdate, MenuItem, Order, OrderItem, OrderItemStatus, OrderItemUpdate,
    OrderStatus, OrderUpdate, Stat, TableStatus,
};
use shared::money;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use super::PosStore;
use crate::db::order_items::NewOrderItem;
use crate::db::orders::NewOrder;
use crate::error::{ServiceError, ServiceResult};

#[derive(Default)]
struct Tables {
    dining_tables: HashMap<i64, DiningTable>,
    orders: HashMap<i64, Order>,
    menu_items: HashMap<i64, MenuItem>,
    order_items: HashMap<i64, OrderItem>,
    stats: HashMap<(i64, i64), Stat>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Tables>,
    next_id: AtomicI64,
    /// When set, every write fails with a database error
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            ..Default::default()
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> ServiceResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::Db("simulated write failure".into()));
        }
        Ok(())
    }

    pub fn insert_table(&self, id: i64, tenant_id: i64, status: TableStatus) -> DiningTable {
        let table = DiningTable {
            id,
            tenant_id,
            area_id: 1,
            name: format!("Masa {id}"),
            capacity: 4,
            pos_x: 0,
            pos_y: 0,
            status,
            is_active: true,
        };
        self.data
            .lock()
            .unwrap()
            .dining_tables
            .insert(id, table.clone());
        table
    }

    pub fn insert_menu_item(&self, id: i64, tenant_id: i64, price: Decimal) -> MenuItem {
        let item = MenuItem {
            id,
            tenant_id,
            category_id: 1,
            name: format!("Item {id}"),
            description: None,
            image: None,
            price,
            preparation_time: None,
            is_available: true,
            is_active: true,
        };
        self.data
            .lock()
            .unwrap()
            .menu_items
            .insert(id, item.clone());
        item
    }

    pub fn table(&self, id: i64) -> Option<DiningTable> {
        self.data.lock().unwrap().dining_tables.get(&id).cloned()
    }

    pub fn order(&self, id: i64) -> Option<Order> {
        self.data.lock().unwrap().orders.get(&id).cloned()
    }

    pub fn stat(&self, tenant_id: i64, day: i64) -> Option<Stat> {
        self.data
            .lock()
            .unwrap()
            .stats
            .get(&(tenant_id, day))
            .cloned()
    }
}

#[async_trait]
impl PosStore for MemoryStore {
    async fn find_table(&self, id: i64) -> ServiceResult<Option<DiningTable>> {
        Ok(self.table(id))
    }

    async fn update_table(
        &self,
        id: i64,
        patch: &DiningTableUpdate,
    ) -> ServiceResult<Option<DiningTable>> {
        self.check_write()?;
        let mut data = self.data.lock().unwrap();
        Ok(data.dining_tables.get_mut(&id).map(|t| {
            patch.apply_to(t);
            t.clone()
        }))
    }

    async fn find_order(&self, id: i64) -> ServiceResult<Option<Order>> {
        Ok(self.order(id))
    }

    async fn create_order(&self, new: &NewOrder) -> ServiceResult<Order> {
        self.check_write()?;
        let order = Order {
            id: self.next_id(),
            tenant_id: new.tenant_id,
            table_id: new.table_id,
            user_id: new.user_id,
            status: OrderStatus::Active,
            start_time: new.start_time,
            end_time: None,
            total_amount: money::to_money(Decimal::ZERO),
            is_paid: false,
            payment_method: None,
            customer_count: new.customer_count,
        };
        self.data
            .lock()
            .unwrap()
            .orders
            .insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, id: i64, patch: &OrderUpdate) -> ServiceResult<Option<Order>> {
        self.check_write()?;
        let mut data = self.data.lock().unwrap();
        Ok(data.orders.get_mut(&id).map(|o| {
            patch.apply_to(o);
            o.clone()
        }))
    }

    async fn add_to_order_total(&self, id: i64, amount: Decimal) -> ServiceResult<Option<Order>> {
        self.check_write()?;
        let mut data = self.data.lock().unwrap();
        Ok(data.orders.get_mut(&id).map(|o| {
            o.total_amount = money::to_money(o.total_amount + amount);
            o.clone()
        }))
    }

    async fn count_active_orders_for_table(&self, table_id: i64) -> ServiceResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data
            .orders
            .values()
            .filter(|o| o.table_id == Some(table_id) && o.status == OrderStatus::Active)
            .count() as i64)
    }

    async fn find_menu_item(&self, id: i64) -> ServiceResult<Option<MenuItem>> {
        Ok(self.data.lock().unwrap().menu_items.get(&id).cloned())
    }

    async fn find_order_item(&self, id: i64) -> ServiceResult<Option<OrderItem>> {
        Ok(self.data.lock().unwrap().order_items.get(&id).cloned())
    }

    async fn create_order_item(&self, new: &NewOrderItem) -> ServiceResult<OrderItem> {
        self.check_write()?;
        let item = OrderItem {
            id: self.next_id(),
            order_id: new.order_id,
            menu_item_id: new.menu_item_id,
            quantity: new.quantity,
            unit_price: new.unit_price,
            status: OrderItemStatus::New,
            notes: new.notes.clone(),
            created_at: new.created_at,
        };
        self.data
            .lock()
            .unwrap()
            .order_items
            .insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_order_item(
        &self,
        id: i64,
        patch: &OrderItemUpdate,
    ) -> ServiceResult<Option<OrderItem>> {
        self.check_write()?;
        let mut data = self.data.lock().unwrap();
        Ok(data.order_items.get_mut(&id).map(|i| {
            patch.apply_to(i);
            i.clone()
        }))
    }

    async fn record_sale(
        &self,
        tenant_id: i64,
        day: i64,
        amount: Decimal,
        customers: i32,
    ) -> ServiceResult<Stat> {
        self.check_write()?;
        let id = self.next_id();
        let mut data = self.data.lock().unwrap();
        let stat = data.stats.entry((tenant_id, day)).or_insert_with(|| Stat {
            id,
            tenant_id,
            date: day,
            daily_revenue: money::to_money(Decimal::ZERO),
            customer_count: 0,
            average_check: money::to_money(Decimal::ZERO),
            occupancy_rate: money::to_money(Decimal::ZERO),
        });
        stat.daily_revenue = money::to_money(stat.daily_revenue + amount);
        stat.customer_count += customers;
        stat.average_check = money::to_money(
            stat.daily_revenue / Decimal::from(stat.customer_count.max(1)),
        );
        Ok(stat.clone())
    }
}
