//! Table-status side effects of order changes

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderStatus, OrderUpdate, TableStatus};

/// What the owning table should become after `patch` produced `updated`.
///
/// - order moved to completed/cancelled and no other active order holds the
///   table → `empty`
/// - explicit `status=active, isPaid=false` on an order with a non-zero total
///   → `bill_requested`
pub fn table_status_after_update(
    patch: &OrderUpdate,
    updated: &Order,
    other_active_orders: i64,
) -> Option<TableStatus> {
    match patch.status {
        Some(status) if status.is_terminal() => {
            (other_active_orders == 0).then_some(TableStatus::Empty)
        }
        Some(OrderStatus::Active)
            if patch.is_paid == Some(false) && !updated.total_amount.is_zero() =>
        {
            Some(TableStatus::BillRequested)
        }
        _ => None,
    }
}

/// `end_time` to persist alongside `patch`: closing an order stamps it once
pub fn end_time_for(patch: &OrderUpdate, current: &Order, now: i64) -> Option<i64> {
    if patch.end_time.is_some() {
        return patch.end_time;
    }
    match patch.status {
        Some(status) if status.is_terminal() && current.end_time.is_none() => Some(now),
        _ => None,
    }
}

/// Items can only be added to an order that is still running
pub fn ensure_open(order: &Order) -> Result<(), AppError> {
    match order.status {
        OrderStatus::Active => Ok(()),
        OrderStatus::Completed => Err(AppError::new(ErrorCode::OrderAlreadyCompleted)
            .with_detail("orderId", order.id)),
        OrderStatus::Cancelled => Err(AppError::new(ErrorCode::OrderAlreadyCancelled)
            .with_detail("orderId", order.id)),
    }
}

pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation("quantity must be at least 1")
            .with_detail("field", "quantity")
            .with_detail("value", quantity));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), AppError> {
    if !shared::money::is_valid_price(price) {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice)
            .with_detail("price", price.to_string()));
    }
    Ok(())
}
