//! Domain error types.

use thiserror::Error;

use crate::status::OrderStatus;

/// Errors raised by domain rules, independent of any storage backend.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input rejected at the boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Checkout attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Illegal order status change.
    #[error("illegal status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
