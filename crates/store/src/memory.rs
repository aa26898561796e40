//! In-memory storage backends for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use domain::{Cart, Order, Product, ProductId};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::store::{CartStore, InventoryStore, OrderStore};

/// In-memory cart store.
///
/// Carts are held as serialized JSON, mimicking an external
/// key-value store; a payload that fails to decode degrades to an
/// empty cart, matching the durability policy of the port.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<CustomerId, String>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a raw payload for a customer. Test hook for exercising
    /// the corrupt-cart degradation path.
    pub async fn put_raw(&self, customer_id: CustomerId, payload: impl Into<String>) {
        self.carts.write().await.insert(customer_id, payload.into());
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load(&self, customer_id: CustomerId) -> Result<Cart> {
        let carts = self.carts.read().await;
        let Some(payload) = carts.get(&customer_id) else {
            return Ok(Cart::new());
        };
        match serde_json::from_str(payload) {
            Ok(cart) => Ok(cart),
            Err(error) => {
                tracing::warn!(%customer_id, %error, "stored cart is corrupt, degrading to empty");
                Ok(Cart::new())
            }
        }
    }

    async fn save(&self, customer_id: CustomerId, cart: &Cart) -> Result<()> {
        let payload = serde_json::to_string(cart)?;
        self.carts.write().await.insert(customer_id, payload);
        Ok(())
    }

    async fn clear(&self, customer_id: CustomerId) -> Result<()> {
        self.carts.write().await.remove(&customer_id);
        Ok(())
    }
}

/// In-memory inventory ledger.
///
/// Reservations take the write lock for the whole check-and-decrement,
/// so concurrent checkouts of the same product serialize on the stock
/// counter.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty inventory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stock for a product, for test assertions.
    pub async fn stock_of(&self, product_id: &ProductId) -> Option<u32> {
        self.products
            .read()
            .await
            .get(product_id)
            .map(|p| p.stock)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product);
        Ok(())
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(product_id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(products)
    }

    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;

        if product.stock < quantity {
            return Err(StoreError::InsufficientStock {
                product_id: product_id.clone(),
                requested: quantity,
                available: product.stock,
            });
        }
        product.stock -= quantity;
        Ok(())
    }

    async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        match products.get_mut(product_id) {
            Some(product) => product.stock += quantity,
            None => {
                tracing::warn!(%product_id, quantity, "release for unknown product, skipping");
            }
        }
        Ok(())
    }

    async fn restock(&self, product_id: &ProductId, quantity: u32) -> Result<u32> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }
        let mut products = self.products.write().await;
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;
        product.stock += quantity;
        Ok(product.stock)
    }
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    fail_on_insert: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail the next inserts with a database
    /// error. Test hook for exercising checkout compensation.
    pub fn set_fail_on_insert(&self, fail: bool) {
        self.fail_on_insert.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        if self.fail_on_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(StoreError::DuplicateOrder(order.id()));
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }

    async fn update(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.id())
            .ok_or(StoreError::OrderNotFound(order.id()))?;
        *stored = order.clone();
        Ok(())
    }

    async fn delete(&self, order_id: OrderId) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.remove(&order_id).is_none() {
            return Err(StoreError::OrderNotFound(order_id));
        }
        Ok(())
    }
}
