//! Unified error system
//!
//! - [`ErrorCode`]: numeric codes grouped by domain
//! - [`ErrorCategory`]: the domain a code belongs to
//! - [`AppError`]: code + message + optional details, rendered as JSON by axum
//! - [`ApiResponse`]: the `{code, message, data?, details?}` envelope
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::ValidationFailed, "name is required")
//!     .with_detail("field", "name");
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, Some(2));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
