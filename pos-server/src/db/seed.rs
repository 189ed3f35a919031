//! Demo data for an empty database

use rust_decimal::Decimal;
use shared::models::{
    AreaCreate, CategoryCreate, DiningTableCreate, MenuItemCreate, OrderItemStatus,
    OrderItemUpdate, TableStatus, TenantCreate, UserCreate, UserRole,
};
use shared::money;
use sqlx::PgPool;

use super::order_items::{self, NewOrderItem};
use super::orders::{self, NewOrder};
use super::{areas, categories, menu_items, tables, tenants, users};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEMO_ADMIN_USERNAME: &str = "admin";
const DEMO_ADMIN_PASSWORD: &str = "password";

/// (category index, name, price in cents, preparation minutes)
const DEMO_MENU: &[(usize, &str, i64, i32)] = &[
    (0, "Ayran", 1500, 1),
    (0, "Kola", 2000, 1),
    (0, "Çay", 1000, 3),
    (1, "Mercimek Çorbası", 3500, 5),
    (1, "Salata", 4000, 7),
    (2, "Adana Kebap", 15000, 15),
    (2, "Pide", 8000, 12),
    (2, "Tavuk Şiş", 12000, 15),
    (3, "Künefe", 6000, 10),
    (3, "Baklava", 7500, 5),
];

/// Insert the demo restaurant when no tenant exists yet. Returns whether anything was seeded.
pub async fn seed_if_empty(pool: &PgPool, now: i64) -> Result<bool, BoxError> {
    if tenants::count(pool).await? > 0 {
        return Ok(false);
    }
    tracing::info!("Seeding database with demo data");

    let tenant = tenants::create(
        pool,
        &TenantCreate {
            name: "Demo Restaurant".into(),
            logo: None,
            address: Some("123 Main St, Example City".into()),
            phone: Some("+90 555 123 4567".into()),
            email: Some("info@demorestaurant.com".into()),
            theme_color: None,
        },
        now,
    )
    .await?;

    let hash = crate::util::hash_password(DEMO_ADMIN_PASSWORD)
        .map_err(|e| format!("hash demo password: {e}"))?;
    let admin = users::create(
        pool,
        &UserCreate {
            tenant_id: tenant.id,
            username: DEMO_ADMIN_USERNAME.into(),
            password: String::new(),
            full_name: "Admin User".into(),
            role: UserRole::Admin,
        },
        &hash,
    )
    .await?;

    let mut area_ids = Vec::new();
    for name in ["İç Alan", "Dış Alan"] {
        let area = areas::create(
            pool,
            tenant.id,
            &AreaCreate {
                name: name.into(),
                is_active: Some(true),
            },
        )
        .await?;
        area_ids.push(area.id);
    }

    let mut table_ids = Vec::new();
    for i in 1..=10i32 {
        let table = tables::create(
            pool,
            tenant.id,
            &DiningTableCreate {
                area_id: if i <= 6 { area_ids[0] } else { area_ids[1] },
                name: format!("Masa {i}"),
                capacity: Some(4),
                pos_x: Some(((i - 1) % 3) * 150),
                pos_y: Some(((i - 1) / 3) * 120),
                status: Some(TableStatus::Empty),
                is_active: Some(true),
            },
        )
        .await?;
        table_ids.push(table.id);
    }

    let mut category_ids = Vec::new();
    for (i, name) in ["İçecekler", "Başlangıçlar", "Ana Yemekler", "Tatlılar"]
        .into_iter()
        .enumerate()
    {
        let category = categories::create(
            pool,
            tenant.id,
            &CategoryCreate {
                name: name.into(),
                image: None,
                sort_order: Some(i as i32),
                is_active: Some(true),
            },
        )
        .await?;
        category_ids.push(category.id);
    }

    let mut menu = Vec::new();
    for &(cat, name, cents, prep) in DEMO_MENU {
        let price = money::to_money(Decimal::new(cents, 2));
        let item = menu_items::create(
            pool,
            tenant.id,
            &MenuItemCreate {
                category_id: category_ids[cat],
                name: name.into(),
                description: None,
                image: None,
                price,
                preparation_time: Some(prep),
                is_available: Some(true),
                is_active: Some(true),
            },
            price,
        )
        .await?;
        menu.push(item);
    }

    // one running order on the first table, opened half an hour ago
    let order = orders::create(
        pool,
        &NewOrder {
            tenant_id: tenant.id,
            table_id: Some(table_ids[0]),
            user_id: admin.id,
            customer_count: 2,
            start_time: now - 30 * 60_000,
        },
    )
    .await?;
    tables::update(
        pool,
        table_ids[0],
        &shared::models::DiningTableUpdate::status(TableStatus::Occupied),
    )
    .await?;

    let lines = [
        (2, 2, OrderItemStatus::Served, None),
        (3, 2, OrderItemStatus::Served, None),
        (5, 1, OrderItemStatus::Preparing, Some("Az acılı")),
        (7, 1, OrderItemStatus::New, None),
    ];
    for (idx, quantity, status, notes) in lines {
        let menu_item = &menu[idx];
        let item = order_items::create(
            pool,
            &NewOrderItem {
                order_id: order.id,
                menu_item_id: menu_item.id,
                quantity,
                unit_price: menu_item.price,
                notes: notes.map(str::to_string),
                created_at: now,
            },
        )
        .await?;
        if status != OrderItemStatus::New {
            order_items::update(pool, item.id, &OrderItemUpdate::status(status)).await?;
        }
        orders::add_to_total(pool, order.id, money::line_total(menu_item.price, quantity)).await?;
    }

    tracing::info!(tenant_id = tenant.id, "Demo data seeded");
    Ok(true)
}
