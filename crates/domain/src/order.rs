//! Order and line item records.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::{Money, ProductId};
use crate::payment::{Payment, PaymentMethod};
use crate::status::OrderStatus;

/// An immutable snapshot of one product as purchased within an order.
///
/// Name and unit price are captured at checkout time and never follow
/// later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Product name at purchase time.
    pub name: String,

    /// Unit price at purchase time.
    pub unit_price: Money,

    /// Quantity purchased.
    pub quantity: u32,

    /// `unit_price × quantity`, computed at construction.
    pub subtotal: Money,
}

impl OrderLineItem {
    /// Creates a new line item, computing the subtotal.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            subtotal: unit_price.multiply(quantity),
        }
    }
}

/// A durable order, owning its line items and payment record.
///
/// The monetary amount is fixed at creation. The status is the only
/// mutable field and changes exclusively through [`Order::transition_to`],
/// which enforces the lifecycle table in [`OrderStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    amount: Money,
    status: OrderStatus,
    payment_method: PaymentMethod,
    created_at: DateTime<Utc>,
    line_items: Vec<OrderLineItem>,
    payment: Payment,
}

impl Order {
    /// Creates a new order in the initial status for its payment method.
    ///
    /// `amount` must already include tax; the checkout orchestrator
    /// computes it from the line item subtotals.
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        amount: Money,
        payment_method: PaymentMethod,
        line_items: Vec<OrderLineItem>,
        payment: Payment,
    ) -> Self {
        Self {
            id,
            customer_id,
            amount,
            status: OrderStatus::initial_for(payment_method),
            payment_method,
            created_at: Utc::now(),
            line_items,
            payment,
        }
    }

    /// Rehydrates an order from storage, trusting the persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: OrderId,
        customer_id: CustomerId,
        amount: Money,
        status: OrderStatus,
        payment_method: PaymentMethod,
        created_at: DateTime<Utc>,
        line_items: Vec<OrderLineItem>,
        payment: Payment,
    ) -> Self {
        Self {
            id,
            customer_id,
            amount,
            status,
            payment_method,
            created_at,
            line_items,
            payment,
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the customer who placed the order.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the total amount including tax.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the line items.
    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    /// Returns the payment record.
    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    /// Returns the sum of line item subtotals, before tax.
    pub fn subtotal(&self) -> Money {
        self.line_items.iter().map(|item| item.subtotal).sum()
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves the order to `target`, failing loudly on an illegal transition.
    pub fn transition_to(&mut self, target: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentStatus;

    fn cod_order() -> Order {
        let order_id = OrderId::new();
        let items = vec![
            OrderLineItem::new("SKU-001", "Widget", Money::from_cents(1000), 2),
            OrderLineItem::new("SKU-002", "Gadget", Money::from_cents(2500), 1),
        ];
        let subtotal: Money = items.iter().map(|i| i.subtotal).sum();
        let amount = subtotal.with_tax_percent(7);
        let payment = Payment::new(order_id, amount, PaymentMethod::Cod, PaymentStatus::Pending);
        Order::new(
            order_id,
            CustomerId::new(),
            amount,
            PaymentMethod::Cod,
            items,
            payment,
        )
    }

    #[test]
    fn test_line_item_subtotal() {
        let item = OrderLineItem::new("SKU-001", "Widget", Money::from_cents(1000), 3);
        assert_eq!(item.subtotal.cents(), 3000);
    }

    #[test]
    fn test_cod_order_starts_pending() {
        let order = cod_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment().status, PaymentStatus::Pending);
    }

    #[test]
    fn test_amount_equals_taxed_subtotal() {
        let order = cod_order();
        assert_eq!(order.subtotal().cents(), 4500);
        assert_eq!(order.amount(), order.subtotal().with_tax_percent(7));
        assert_eq!(order.payment().amount, order.amount());
    }

    #[test]
    fn test_qr_order_starts_paid() {
        let order_id = OrderId::new();
        let items = vec![OrderLineItem::new(
            "SKU-001",
            "Widget",
            Money::from_cents(1000),
            1,
        )];
        let amount = Money::from_cents(1070);
        let payment = Payment::new(order_id, amount, PaymentMethod::Qr, PaymentStatus::Completed);
        let order = Order::new(
            order_id,
            CustomerId::new(),
            amount,
            PaymentMethod::Qr,
            items,
            payment,
        );
        assert_eq!(order.status(), OrderStatus::Paid);
    }

    #[test]
    fn test_legal_transition_chain() {
        let mut order = cod_order();
        order.transition_to(OrderStatus::Approved).unwrap();
        order.transition_to(OrderStatus::Paid).unwrap();
        order.transition_to(OrderStatus::Packing).unwrap();
        order.transition_to(OrderStatus::Shipped).unwrap();
        assert!(order.is_terminal());
    }

    #[test]
    fn test_illegal_transition_leaves_status_unchanged() {
        let mut order = cod_order();
        let result = order.transition_to(OrderStatus::Packing);
        assert!(matches!(
            result,
            Err(DomainError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Packing,
            })
        ));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_double_cancel_rejected() {
        let mut order = cod_order();
        order.transition_to(OrderStatus::Cancelled).unwrap();
        let result = order.transition_to(OrderStatus::Cancelled);
        assert!(matches!(
            result,
            Err(DomainError::InvalidTransition { .. })
        ));
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let order = cod_order();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
