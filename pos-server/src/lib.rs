//! pos-server — restaurant POS backend
//!
//! - Resource API: tenant-scoped REST over PostgreSQL
//! - Session gate: cookie JWT on every route except login/register/health
//! - Live channel: `/ws`, per-tenant fanout of table/order/order-item changes

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod orders;
pub mod state;
pub mod store;
pub mod util;

pub use config::Config;
pub use state::AppState;
