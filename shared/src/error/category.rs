//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain an error code belongs to, derived from its thousands digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Tenant,
    Order,
    Payment,
    Menu,
    Table,
    Staff,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Tenant,
            4 => Self::Order,
            5 => Self::Payment,
            6 => Self::Menu,
            7 => Self::Table,
            8 => Self::Staff,
            _ => Self::System,
        }
    }

    /// System errors are logged server-side; everything else is the caller's fault.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Menu);
        assert_eq!(ErrorCategory::from_code(7101), ErrorCategory::Table);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TenantMismatch.category(), ErrorCategory::Permission);
        assert_eq!(ErrorCode::OrderAlreadyCompleted.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::UsernameExists.category(), ErrorCategory::Staff);
        assert!(ErrorCode::DatabaseError.category().is_system());
        assert!(!ErrorCode::ValidationFailed.category().is_system());
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Menu).unwrap();
        assert_eq!(json, "\"menu\"");
    }
}
