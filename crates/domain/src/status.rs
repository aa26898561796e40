//! Order status state machine.

use serde::{Deserialize, Serialize};

use crate::payment::PaymentMethod;

/// The status of an order in its lifecycle.
///
/// Legal transitions:
/// ```text
/// Pending ──► Approved ──► Paid ──► Packing ──► Shipped
///    │            │          │
///    └────────────┴──────────┴──► Cancelled
/// ```
///
/// QR and card orders start directly at `Paid`; only cash-on-delivery
/// orders pass through `Pending` and `Approved`. `Shipped` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting staff approval (initial status for cash-on-delivery).
    #[default]
    Pending,

    /// Approved by staff, awaiting payment.
    Approved,

    /// Payment settled (initial status for QR/card).
    Paid,

    /// Being packed for dispatch.
    Packing,

    /// Dispatched (terminal status, success path).
    Shipped,

    /// Cancelled before dispatch (terminal status).
    Cancelled,
}

impl OrderStatus {
    /// Returns the initial status for a freshly checked-out order.
    pub fn initial_for(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cod => OrderStatus::Pending,
            PaymentMethod::Qr | PaymentMethod::Card => OrderStatus::Paid,
        }
    }

    /// Returns the statuses reachable from this one.
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Approved, OrderStatus::Cancelled],
            OrderStatus::Approved => &[OrderStatus::Paid, OrderStatus::Cancelled],
            OrderStatus::Paid => &[OrderStatus::Packing, OrderStatus::Cancelled],
            OrderStatus::Packing => &[OrderStatus::Shipped],
            OrderStatus::Shipped | OrderStatus::Cancelled => &[],
        }
    }

    /// Returns true if `target` is reachable from this status.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Paid => "paid",
            OrderStatus::Packing => "packing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = crate::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "approved" => Ok(OrderStatus::Approved),
            "paid" => Ok(OrderStatus::Paid),
            "packing" => Ok(OrderStatus::Packing),
            "shipped" => Ok(OrderStatus::Shipped),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(crate::error::DomainError::Validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}
