//! Checkout and lifecycle error types.

use common::OrderId;
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while placing or transitioning an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A business rule was violated.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// A storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The payment gateway rejected or failed the authorization.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
