//! Database access layer
//!
//! One module per resource; plain async functions over `&PgPool`.

pub mod areas;
pub mod categories;
pub mod dashboard;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod seed;
pub mod stats;
pub mod tables;
pub mod tenants;
pub mod users;
