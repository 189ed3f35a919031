//! Shared types for the POS workspace
//!
//! Domain models, status enums, the live channel protocol, the unified
//! error system and money/time helpers used by both server and client.

pub mod error;
pub mod live;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use http;
pub use live::{LiveCommand, LiveMessage};
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};
