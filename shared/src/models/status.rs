//! Status enums
//!
//! Stored as TEXT in Postgres and sent as snake_case strings on the wire.
//! Anything outside the closed set is rejected at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unrecognised status value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status: {value:?}")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[cfg_attr(feature = "db", derive(sqlx::Type))]
        #[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err(ParseStatusError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseStatusError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

status_enum! {
    /// Floor-plan state of a dining table
    TableStatus, "table" {
        #[default]
        Empty => "empty",
        Occupied => "occupied",
        /// Guests asked for the bill; payment pending
        BillRequested => "bill_requested",
    }
}

status_enum! {
    OrderStatus, "order" {
        #[default]
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

status_enum! {
    /// Kitchen progress of a single order line
    OrderItemStatus, "order item" {
        #[default]
        New => "new",
        Preparing => "preparing",
        Served => "served",
        Cancelled => "cancelled",
    }
}

status_enum! {
    UserRole, "user role" {
        Admin => "admin",
        Manager => "manager",
        #[default]
        Waiter => "waiter",
        Chef => "chef",
    }
}

impl TableStatus {
    /// Next state when a table is tapped on the floor plan:
    /// empty → occupied → bill_requested → empty
    pub const fn next(self) -> Self {
        match self {
            TableStatus::Empty => TableStatus::Occupied,
            TableStatus::Occupied => TableStatus::BillRequested,
            TableStatus::BillRequested => TableStatus::Empty,
        }
    }
}

impl OrderStatus {
    /// Completed and cancelled orders no longer hold their table
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_status_cycle() {
        let mut s = TableStatus::Empty;
        s = s.next();
        assert_eq!(s, TableStatus::Occupied);
        s = s.next();
        assert_eq!(s, TableStatus::BillRequested);
        s = s.next();
        assert_eq!(s, TableStatus::Empty);
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(
            serde_json::to_string(&TableStatus::BillRequested).unwrap(),
            "\"bill_requested\""
        );
        let s: OrderItemStatus = serde_json::from_str("\"preparing\"").unwrap();
        assert_eq!(s, OrderItemStatus::Preparing);
    }

    #[test]
    fn test_as_str_matches_serde() {
        for s in TableStatus::ALL {
            let json = serde_json::to_string(s).unwrap();
            assert_eq!(json, format!("\"{}\"", s.as_str()));
        }
        for s in OrderStatus::ALL {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), *s);
        }
    }

    #[test]
    fn test_unknown_value_rejected() {
        let err = "dirty".parse::<TableStatus>().unwrap_err();
        assert_eq!(err.kind, "table");
        assert_eq!(err.value, "dirty");
        assert!(serde_json::from_str::<OrderStatus>("\"paid\"").is_err());
        assert!(OrderItemStatus::try_from("Served".to_string()).is_err());
    }

    #[test]
    fn test_terminal_orders() {
        assert!(!OrderStatus::Active.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }
}
