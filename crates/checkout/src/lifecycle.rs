//! Order lifecycle management.

use common::OrderId;
use domain::{Order, OrderStatus};
use store::{InventoryStore, OrderStore};

use crate::error::{CheckoutError, Result};

/// Moves persisted orders through their status lifecycle.
///
/// Transition legality lives in [`Order::transition_to`]; this manager
/// adds persistence and the cancellation side effect of restoring the
/// reserved stock. Because a cancelled order has no further transitions,
/// the restore can run at most once per order.
pub struct OrderLifecycle<O, I>
where
    O: OrderStore,
    I: InventoryStore,
{
    orders: O,
    inventory: I,
}

impl<O, I> OrderLifecycle<O, I>
where
    O: OrderStore,
    I: InventoryStore,
{
    /// Creates a new lifecycle manager.
    pub fn new(orders: O, inventory: I) -> Self {
        Self { orders, inventory }
    }

    /// Transitions an order to `target`, persisting the new status.
    ///
    /// Cancellation returns each line item's quantity to the inventory
    /// ledger before the terminal status is persisted, so a failed
    /// release leaves the order cancellable again on retry instead of
    /// stranding the reserved stock behind a terminal state. An illegal
    /// transition fails before any stock moves.
    #[tracing::instrument(skip(self))]
    pub async fn transition(&self, order_id: OrderId, target: OrderStatus) -> Result<Order> {
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        let previous = order.status();
        order.transition_to(target)?;

        if target == OrderStatus::Cancelled {
            self.release_line_items(&order).await?;
        }

        if let Err(error) = self.orders.update(&order).await {
            if target == OrderStatus::Cancelled {
                self.reclaim_line_items(&order).await;
            }
            return Err(error.into());
        }

        if target == OrderStatus::Cancelled {
            metrics::counter!("orders_cancelled_total").increment(1);
        }
        tracing::info!(%order_id, %previous, status = %target, "order transitioned");

        Ok(order)
    }

    /// Restores each line item's quantity, undoing on partial failure
    /// so the restore stays all-or-nothing.
    async fn release_line_items(&self, order: &Order) -> Result<()> {
        let mut released = Vec::with_capacity(order.line_items().len());
        for item in order.line_items() {
            if let Err(error) = self.inventory.release(&item.product_id, item.quantity).await {
                for undone in released.into_iter().rev() {
                    self.reclaim(undone).await;
                }
                return Err(error.into());
            }
            released.push(item);
        }
        Ok(())
    }

    /// Compensating re-reserve of every line item's quantity.
    async fn reclaim_line_items(&self, order: &Order) {
        for item in order.line_items().iter().rev() {
            self.reclaim(item).await;
        }
    }

    async fn reclaim(&self, item: &domain::OrderLineItem) {
        if let Err(error) = self
            .inventory
            .reserve(&item.product_id, item.quantity)
            .await
        {
            tracing::error!(
                product_id = %item.product_id,
                quantity = item.quantity,
                %error,
                "failed to reclaim released stock"
            );
        }
    }

    /// Moves a pending order to approved.
    pub async fn approve(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, OrderStatus::Approved).await
    }

    /// Records payment receipt for an approved order.
    pub async fn mark_paid(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, OrderStatus::Paid).await
    }

    /// Moves a paid order into packing.
    pub async fn start_packing(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, OrderStatus::Packing).await
    }

    /// Marks a packed order as shipped.
    pub async fn ship(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, OrderStatus::Shipped).await
    }

    /// Cancels an order, restoring its reserved stock.
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, OrderStatus::Cancelled).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::CustomerId;
    use domain::{
        DomainError, Money, OrderLineItem, Payment, PaymentMethod, PaymentStatus, Product,
        ProductId,
    };
    use store::{InMemoryInventoryStore, InMemoryOrderStore};

    async fn setup() -> (
        OrderLifecycle<InMemoryOrderStore, InMemoryInventoryStore>,
        InMemoryInventoryStore,
        OrderId,
    ) {
        let inventory = InMemoryInventoryStore::new();
        let orders = InMemoryOrderStore::new();

        // Stock already decremented by checkout: 10 on hand, 2 reserved.
        inventory
            .insert_product(Product::new(
                "SKU-001",
                "Widget",
                Money::from_cents(10000),
                8,
                "tools",
            ))
            .await
            .unwrap();

        let order_id = OrderId::new();
        let items = vec![OrderLineItem::new(
            "SKU-001",
            "Widget",
            Money::from_cents(10000),
            2,
        )];
        let amount = Money::from_cents(20000).with_tax_percent(7);
        let payment = Payment::new(order_id, amount, PaymentMethod::Cod, PaymentStatus::Pending);
        let order = Order::new(
            order_id,
            CustomerId::new(),
            amount,
            PaymentMethod::Cod,
            items,
            payment,
        );
        orders.insert(&order).await.unwrap();

        (OrderLifecycle::new(orders, inventory.clone()), inventory, order_id)
    }

    #[tokio::test]
    async fn test_full_lifecycle_to_shipped() {
        let (lifecycle, _, order_id) = setup().await;

        lifecycle.approve(order_id).await.unwrap();
        lifecycle.mark_paid(order_id).await.unwrap();
        lifecycle.start_packing(order_id).await.unwrap();
        let order = lifecycle.ship(order_id).await.unwrap();

        assert_eq!(order.status(), OrderStatus::Shipped);
        assert!(order.is_terminal());
    }

    #[tokio::test]
    async fn test_cancel_restores_stock() {
        let (lifecycle, inventory, order_id) = setup().await;

        lifecycle.cancel(order_id).await.unwrap();
        assert_eq!(inventory.stock_of(&ProductId::new("SKU-001")).await, Some(10));
    }

    #[tokio::test]
    async fn test_second_cancel_fails_without_touching_stock() {
        let (lifecycle, inventory, order_id) = setup().await;

        lifecycle.cancel(order_id).await.unwrap();
        let result = lifecycle.cancel(order_id).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Domain(DomainError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Cancelled,
            }))
        ));
        assert_eq!(inventory.stock_of(&ProductId::new("SKU-001")).await, Some(10));
    }

    #[tokio::test]
    async fn test_cancel_after_packing_is_rejected() {
        let (lifecycle, inventory, order_id) = setup().await;

        lifecycle.approve(order_id).await.unwrap();
        lifecycle.mark_paid(order_id).await.unwrap();
        lifecycle.start_packing(order_id).await.unwrap();

        let result = lifecycle.cancel(order_id).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Domain(DomainError::InvalidTransition { .. }))
        ));
        assert_eq!(inventory.stock_of(&ProductId::new("SKU-001")).await, Some(8));
    }

    #[tokio::test]
    async fn test_skipping_states_is_rejected() {
        let (lifecycle, _, order_id) = setup().await;

        let result = lifecycle.ship(order_id).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Domain(DomainError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let (lifecycle, _, _) = setup().await;
        let result = lifecycle.approve(OrderId::new()).await;
        assert!(matches!(result, Err(CheckoutError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_release_keeps_order_cancellable() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Duration;

        use store::StoreError;

        /// Inventory wrapper whose next release fails with a storage error.
        #[derive(Clone)]
        struct FlakyReleaseInventory {
            inner: InMemoryInventoryStore,
            fail_next_release: Arc<AtomicBool>,
        }

        #[async_trait::async_trait]
        impl store::InventoryStore for FlakyReleaseInventory {
            async fn insert_product(&self, product: Product) -> store::Result<()> {
                self.inner.insert_product(product).await
            }

            async fn get_product(
                &self,
                product_id: &ProductId,
            ) -> store::Result<Option<Product>> {
                self.inner.get_product(product_id).await
            }

            async fn list_products(&self) -> store::Result<Vec<Product>> {
                self.inner.list_products().await
            }

            async fn reserve(&self, product_id: &ProductId, quantity: u32) -> store::Result<()> {
                self.inner.reserve(product_id, quantity).await
            }

            async fn release(&self, product_id: &ProductId, quantity: u32) -> store::Result<()> {
                if self.fail_next_release.swap(false, Ordering::SeqCst) {
                    return Err(StoreError::Timeout(Duration::from_millis(10)));
                }
                self.inner.release(product_id, quantity).await
            }

            async fn restock(&self, product_id: &ProductId, quantity: u32) -> store::Result<u32> {
                self.inner.restock(product_id, quantity).await
            }
        }

        let inner = InMemoryInventoryStore::new();
        inner
            .insert_product(Product::new(
                "SKU-001",
                "Widget",
                Money::from_cents(10000),
                6,
                "tools",
            ))
            .await
            .unwrap();
        let flaky = FlakyReleaseInventory {
            inner: inner.clone(),
            fail_next_release: Arc::new(AtomicBool::new(true)),
        };

        let orders = InMemoryOrderStore::new();
        let order_id = OrderId::new();
        let items = vec![OrderLineItem::new(
            "SKU-001",
            "Widget",
            Money::from_cents(10000),
            4,
        )];
        let amount = Money::from_cents(40000).with_tax_percent(7);
        let payment = Payment::new(order_id, amount, PaymentMethod::Cod, PaymentStatus::Pending);
        orders
            .insert(&Order::new(
                order_id,
                CustomerId::new(),
                amount,
                PaymentMethod::Cod,
                items,
                payment,
            ))
            .await
            .unwrap();

        let lifecycle = OrderLifecycle::new(orders.clone(), flaky);

        // The failed release surfaces and the terminal status is not
        // persisted, so the reserved stock is not stranded.
        let result = lifecycle.cancel(order_id).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Store(StoreError::Timeout(_)))
        ));
        let stored = orders.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Pending);
        assert_eq!(inner.stock_of(&ProductId::new("SKU-001")).await, Some(6));

        // Once the fault clears, retrying restores stock exactly once.
        lifecycle.cancel(order_id).await.unwrap();
        assert_eq!(
            orders.get(order_id).await.unwrap().unwrap().status(),
            OrderStatus::Cancelled
        );
        assert_eq!(inner.stock_of(&ProductId::new("SKU-001")).await, Some(10));
    }

    #[tokio::test]
    async fn test_cancel_tolerates_deleted_product() {
        let (lifecycle, _, order_id) = setup().await;

        // Product removed from the catalog after the order was placed;
        // the tolerant release still lets the cancellation finish.
        let lifecycle = OrderLifecycle::new(lifecycle.orders, InMemoryInventoryStore::new());

        let order = lifecycle.cancel(order_id).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }
}
