//! Storage port definitions.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use domain::{Cart, Order, Product, ProductId};

use crate::error::{Result, StoreError};

/// Runs a storage future under a bounded timeout.
///
/// Persistence calls must never hang; on expiry the operation surfaces
/// [`StoreError::Timeout`] instead.
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}

/// Durable storage for per-customer carts.
///
/// The cart survives restarts but is never the system of record for
/// stock or prices; a corrupt persisted payload degrades to an empty
/// cart rather than failing the load.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads the customer's cart, or an empty cart if none is stored
    /// or the stored payload cannot be decoded.
    async fn load(&self, customer_id: CustomerId) -> Result<Cart>;

    /// Persists the customer's cart.
    async fn save(&self, customer_id: CustomerId, cart: &Cart) -> Result<()>;

    /// Removes the customer's cart. No-op if absent.
    async fn clear(&self, customer_id: CustomerId) -> Result<()>;
}

/// The inventory ledger: owns every product's stock counter.
///
/// `reserve` is the only operation requiring strict mutual exclusion;
/// both backends implement it as a single atomic conditional decrement.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Inserts or replaces a catalog product.
    async fn insert_product(&self, product: Product) -> Result<()>;

    /// Looks up a product by ID.
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>>;

    /// Lists all products.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Atomically checks `stock >= quantity` and decrements; fails with
    /// [`StoreError::InsufficientStock`] without mutation otherwise.
    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<()>;

    /// Compensating increment, undoing a reservation. Tolerates a
    /// product deleted since the reservation was made.
    async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<()>;

    /// Unconditionally increments stock by a positive quantity,
    /// returning the new stock level.
    async fn restock(&self, product_id: &ProductId, quantity: u32) -> Result<u32>;
}

/// Durable storage for orders.
///
/// An order record carries its line items and payment; `insert` and
/// `delete` move all three together, mirroring the ownership model.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order with its line items and payment as one
    /// atomic unit. Fails on duplicate order ID.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Loads an order by ID.
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Lists all orders, newest first.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Persists the mutable fields of an existing order.
    ///
    /// Only the status ever changes after creation, and the transition
    /// must already have been validated through [`Order::transition_to`].
    async fn update(&self, order: &Order) -> Result<()>;

    /// Deletes an order together with its line items and payment.
    async fn delete(&self, order_id: OrderId) -> Result<()>;
}
