//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::TenantNotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::MenuItemNotFound
            | Self::CategoryNotFound
            | Self::TableNotFound
            | Self::AreaNotFound => StatusCode::NOT_FOUND,

            Self::OrderAlreadyCompleted
            | Self::OrderAlreadyCancelled
            | Self::UsernameExists => StatusCode::CONFLICT,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::SessionExpired
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            Self::TenantMismatch => StatusCode::FORBIDDEN,

            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // validation and business rules
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
