//! Data models
//!
//! Shared between pos-server, pos-client and the browser frontend.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (Postgres BIGSERIAL), timestamps are Unix millis,
//! and JSON field names are camelCase.

pub mod area;
pub mod category;
pub mod dashboard;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod stat;
pub mod status;
pub mod tenant;
pub mod user;

// Re-exports
pub use area::*;
pub use category::*;
pub use dashboard::*;
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
pub use order_item::*;
pub use stat::*;
pub use status::*;
pub use tenant::*;
pub use user::*;
