//! Unified error codes for the POS workspace
//!
//! Shared by pos-server, pos-client and the browser frontend.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors
//! - 4xxx: Order errors
//! - 6xxx: Menu errors
//! - 7xxx: Table / area errors
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Session has expired
    SessionExpired = 1005,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Too many login attempts
    TooManyAttempts = 1008,

    // ==================== 2xxx: Permission ====================
    /// Resource belongs to another tenant
    TenantMismatch = 2002,

    // ==================== 3xxx: Tenant ====================
    /// Tenant not found
    TenantNotFound = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4004,
    /// Order item not found
    OrderItemNotFound = 4006,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6002,
    /// Menu item is not available
    MenuItemUnavailable = 6003,
    /// Category not found
    CategoryNotFound = 6101,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Area not found
    AreaNotFound = 7101,

    // ==================== 8xxx: Staff ====================
    /// Username already exists
    UsernameExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "Not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::TooManyAttempts => "Too many attempts, try again later",

            // Permission
            ErrorCode::TenantMismatch => "Resource belongs to another tenant",

            // Tenant
            ErrorCode::TenantNotFound => "Tenant not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::OrderItemNotFound => "Order item not found",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Menu item has invalid price",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::CategoryNotFound => "Category not found",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::AreaNotFound => "Area not found",

            // Staff
            ErrorCode::UsernameExists => "Username already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1005 => Ok(ErrorCode::SessionExpired),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2002 => Ok(ErrorCode::TenantMismatch),

            // Tenant
            3002 => Ok(ErrorCode::TenantNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4004 => Ok(ErrorCode::OrderAlreadyCancelled),
            4006 => Ok(ErrorCode::OrderItemNotFound),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemInvalidPrice),
            6003 => Ok(ErrorCode::MenuItemUnavailable),
            6101 => Ok(ErrorCode::CategoryNotFound),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7101 => Ok(ErrorCode::AreaNotFound),

            // Staff
            8002 => Ok(ErrorCode::UsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
