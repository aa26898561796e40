use std::time::Duration;

use common::OrderId;
use domain::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested quantity exceeds the available stock.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Restock or release called with a non-positive quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The product does not exist in the ledger.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order with this ID already exists.
    #[error("duplicate order id: {0}")]
    DuplicateOrder(OrderId),

    /// A storage operation exceeded its bounded timeout.
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
