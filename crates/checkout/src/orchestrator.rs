//! Checkout orchestration with compensating rollback.

use std::time::Duration;

use common::{CustomerId, OrderId};
use domain::{
    Cart, DEFAULT_TAX_PERCENT, DomainError, Order, OrderLineItem, Payment, PaymentMethod,
};
use store::{CartStore, InventoryStore, OrderStore, with_timeout};

use crate::error::Result;
use crate::gateway::PaymentGateway;

/// Default bound on each persistence call during checkout.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Drives a cart through reservation, payment, and persistence.
///
/// Checkout is a 3-step sequence (reserve inventory, authorize payment,
/// persist the order) with compensating stock releases on failure. The
/// cart is cleared only after the order is durably stored, so a failed
/// checkout leaves both cart and inventory exactly as they were.
pub struct CheckoutOrchestrator<C, I, O, G>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    carts: C,
    inventory: I,
    orders: O,
    gateway: G,
    tax_percent: u32,
    store_timeout: Duration,
}

impl<C, I, O, G> CheckoutOrchestrator<C, I, O, G>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    /// Creates a new orchestrator with the default tax rate and timeout.
    pub fn new(carts: C, inventory: I, orders: O, gateway: G) -> Self {
        Self {
            carts,
            inventory,
            orders,
            gateway,
            tax_percent: DEFAULT_TAX_PERCENT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Overrides the tax rate applied to the order subtotal.
    pub fn with_tax_percent(mut self, tax_percent: u32) -> Self {
        self.tax_percent = tax_percent;
        self
    }

    /// Overrides the per-call persistence timeout.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Checks out the customer's stored cart.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(
        &self,
        customer_id: CustomerId,
        method: PaymentMethod,
    ) -> Result<Order> {
        let cart = self.carts.load(customer_id).await?;
        let order = self.checkout_cart(customer_id, &cart, method).await?;

        // The order is durable; a failed cart clear must not unwind it.
        if let Err(error) = self.carts.clear(customer_id).await {
            tracing::warn!(%customer_id, %error, "failed to clear cart after checkout");
        }
        Ok(order)
    }

    /// Checks out an explicit cart snapshot.
    ///
    /// Reservation order is deterministic (sorted by product ID), so two
    /// overlapping checkouts contend for products in the same sequence.
    #[tracing::instrument(skip(self, cart), fields(items = cart.len()))]
    pub async fn checkout_cart(
        &self,
        customer_id: CustomerId,
        cart: &Cart,
        method: PaymentMethod,
    ) -> Result<Order> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.run_checkout(customer_id, cart, method).await;
        match &result {
            Ok(order) => {
                metrics::counter!("checkout_success_total").increment(1);
                metrics::histogram!("checkout_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(
                    order_id = %order.id(),
                    amount = %order.amount(),
                    status = %order.status(),
                    "checkout completed"
                );
            }
            Err(error) => {
                metrics::counter!("checkout_failures_total").increment(1);
                tracing::warn!(%customer_id, %error, "checkout failed");
            }
        }
        result
    }

    async fn run_checkout(
        &self,
        customer_id: CustomerId,
        cart: &Cart,
        method: PaymentMethod,
    ) -> Result<Order> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart.into());
        }

        let mut entries: Vec<_> = cart.items().collect();
        entries.sort_by(|a, b| a.product_id.as_str().cmp(b.product_id.as_str()));

        // Step 1: reserve stock per product, releasing everything already
        // granted if any reservation fails. Prices come from the ledger,
        // not from the cart snapshot.
        let mut reserved: Vec<(domain::ProductId, u32)> = Vec::with_capacity(entries.len());
        let mut line_items = Vec::with_capacity(entries.len());
        for entry in entries {
            let product = match self.inventory.get_product(&entry.product_id).await {
                Ok(Some(product)) => product,
                Ok(None) => {
                    self.release_all(&reserved).await;
                    return Err(store::StoreError::ProductNotFound(entry.product_id.clone())
                        .into());
                }
                Err(error) => {
                    self.release_all(&reserved).await;
                    return Err(error.into());
                }
            };

            if let Err(error) = self.inventory.reserve(&entry.product_id, entry.quantity).await {
                self.release_all(&reserved).await;
                return Err(error.into());
            }
            reserved.push((entry.product_id.clone(), entry.quantity));
            line_items.push(OrderLineItem::new(
                product.id,
                product.name,
                product.price,
                entry.quantity,
            ));
        }

        let subtotal: domain::Money = line_items.iter().map(|item| item.subtotal).sum();
        let amount = subtotal.with_tax_percent(self.tax_percent);

        // Step 2: authorize payment.
        let order_id = OrderId::new();
        let authorization = match self
            .gateway
            .authorize(order_id, customer_id, amount, method)
            .await
        {
            Ok(authorization) => authorization,
            Err(error) => {
                self.release_all(&reserved).await;
                return Err(error);
            }
        };

        let payment = Payment {
            order_id,
            amount,
            method,
            status: authorization.status,
            transaction_id: authorization.transaction_id,
            paid_at: chrono::Utc::now(),
        };
        let order = Order::new(order_id, customer_id, amount, method, line_items, payment);

        // Step 3: persist the order atomically, under a bounded timeout.
        if let Err(error) = with_timeout(self.store_timeout, self.orders.insert(&order)).await {
            self.release_all(&reserved).await;
            return Err(error.into());
        }

        Ok(order)
    }

    /// Compensating release of every granted reservation, in reverse.
    async fn release_all(&self, reserved: &[(domain::ProductId, u32)]) {
        for (product_id, quantity) in reserved.iter().rev() {
            if let Err(error) = self.inventory.release(product_id, *quantity).await {
                tracing::error!(%product_id, quantity, %error, "compensating release failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, OrderStatus, PaymentStatus, Product};
    use store::{InMemoryCartStore, InMemoryInventoryStore, InMemoryOrderStore};

    use crate::error::CheckoutError;
    use crate::gateway::InstantPaymentGateway;

    fn orchestrator() -> (
        CheckoutOrchestrator<
            InMemoryCartStore,
            InMemoryInventoryStore,
            InMemoryOrderStore,
            InstantPaymentGateway,
        >,
        InMemoryInventoryStore,
        InMemoryOrderStore,
    ) {
        let inventory = InMemoryInventoryStore::new();
        let orders = InMemoryOrderStore::new();
        let orchestrator = CheckoutOrchestrator::new(
            InMemoryCartStore::new(),
            inventory.clone(),
            orders.clone(),
            InstantPaymentGateway::new(),
        );
        (orchestrator, inventory, orders)
    }

    fn widget(stock: u32) -> Product {
        Product::new("SKU-001", "Widget", Money::from_cents(10000), stock, "tools")
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (orchestrator, _, orders) = orchestrator();
        let result = orchestrator
            .checkout_cart(CustomerId::new(), &Cart::new(), PaymentMethod::Cod)
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::Domain(DomainError::EmptyCart))
        ));
        assert_eq!(orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_amount_uses_ledger_price_not_cart_price() {
        let (orchestrator, inventory, _) = orchestrator();
        inventory.insert_product(widget(10)).await.unwrap();

        // Cart captured a stale price; checkout must ignore it.
        let stale = Product::new("SKU-001", "Widget", Money::from_cents(1), 10, "tools");
        let mut cart = Cart::new();
        cart.add(&stale, 2);

        let order = orchestrator
            .checkout_cart(CustomerId::new(), &cart, PaymentMethod::Cod)
            .await
            .unwrap();

        assert_eq!(order.subtotal().cents(), 20000);
        assert_eq!(order.amount().cents(), 21400);
        assert_eq!(order.line_items()[0].unit_price.cents(), 10000);
    }

    #[tokio::test]
    async fn test_cod_order_pending_payment_pending() {
        let (orchestrator, inventory, _) = orchestrator();
        inventory.insert_product(widget(10)).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&widget(10), 1);
        let order = orchestrator
            .checkout_cart(CustomerId::new(), &cart, PaymentMethod::Cod)
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment().status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_card_order_paid_payment_completed() {
        let (orchestrator, inventory, _) = orchestrator();
        inventory.insert_product(widget(10)).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&widget(10), 1);
        let order = orchestrator
            .checkout_cart(CustomerId::new(), &cart, PaymentMethod::Card)
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.payment().status, PaymentStatus::Completed);
    }
}
