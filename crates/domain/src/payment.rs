//! Payment records and methods.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::money::Money;

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// QR code transfer, settled immediately.
    Qr,
    /// Card payment, settled immediately.
    Card,
    /// Cash on delivery, settled after dispatch.
    Cod,
}

impl PaymentMethod {
    /// Returns the method name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Qr => "qr",
            PaymentMethod::Card => "card",
            PaymentMethod::Cod => "cod",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qr" => Ok(PaymentMethod::Qr),
            "card" => Ok(PaymentMethod::Card),
            "cod" => Ok(PaymentMethod::Cod),
            other => Err(DomainError::Validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// Settlement status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting settlement (cash on delivery).
    Pending,
    /// Settled.
    Completed,
    /// Settlement failed.
    Failed,
}

impl PaymentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unique payment transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generates a fresh `TXN-` prefixed identifier.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("TXN-{}", &suffix[..9]))
    }

    /// Creates a transaction ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payment record, owned 1:1 by its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// The order this payment settles.
    pub order_id: OrderId,

    /// Amount charged, mirrors the order amount.
    pub amount: Money,

    /// Payment method.
    pub method: PaymentMethod,

    /// Settlement status.
    pub status: PaymentStatus,

    /// Globally unique transaction identifier.
    pub transaction_id: TransactionId,

    /// When the payment record was created.
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment record with a freshly generated transaction ID.
    pub fn new(
        order_id: OrderId,
        amount: Money,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Self {
        Self {
            order_id,
            amount,
            method,
            status,
            transaction_id: TransactionId::generate(),
            paid_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("qr".parse::<PaymentMethod>().unwrap(), PaymentMethod::Qr);
        assert_eq!(
            "card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Card
        );
        assert_eq!("cod".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cod);
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_transaction_id_format() {
        let id = TransactionId::generate();
        assert!(id.as_str().starts_with("TXN-"));
        assert_eq!(id.as_str().len(), 13);
    }

    #[test]
    fn test_transaction_ids_are_unique() {
        let a = TransactionId::generate();
        let b = TransactionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_payment_mirrors_order_amount() {
        let order_id = OrderId::new();
        let payment = Payment::new(
            order_id,
            Money::from_cents(21400),
            PaymentMethod::Cod,
            PaymentStatus::Pending,
        );
        assert_eq!(payment.order_id, order_id);
        assert_eq!(payment.amount.cents(), 21400);
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).unwrap(),
            "\"cod\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
