//! Payment gateway port and in-process implementation.

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use domain::{Money, PaymentMethod, PaymentStatus, TransactionId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{CheckoutError, Result};

/// Outcome of a successful payment authorization.
#[derive(Debug, Clone)]
pub struct PaymentAuthorization {
    /// Payment status assigned by the gateway.
    pub status: PaymentStatus,

    /// Transaction reference assigned by the gateway.
    pub transaction_id: TransactionId,
}

/// Trait for authorizing payments during checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorizes payment of `amount` for an order.
    ///
    /// Cash on delivery is accepted without settling, leaving the
    /// payment pending until the courier collects. Electronic methods
    /// settle immediately.
    async fn authorize(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<PaymentAuthorization>;
}

/// In-process gateway that settles electronic payments instantly.
#[derive(Debug, Clone, Default)]
pub struct InstantPaymentGateway {
    fail_on_authorize: Arc<AtomicBool>,
    authorizations: Arc<AtomicUsize>,
}

impl InstantPaymentGateway {
    /// Creates a new gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline the next authorize calls.
    /// Test hook for exercising checkout compensation.
    pub fn set_fail_on_authorize(&self, fail: bool) {
        self.fail_on_authorize.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of successful authorizations.
    pub fn authorization_count(&self) -> usize {
        self.authorizations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for InstantPaymentGateway {
    async fn authorize(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<PaymentAuthorization> {
        if self.fail_on_authorize.load(Ordering::SeqCst) {
            return Err(CheckoutError::Gateway("Payment declined".to_string()));
        }

        let status = match method {
            PaymentMethod::Cod => PaymentStatus::Pending,
            PaymentMethod::Qr | PaymentMethod::Card => PaymentStatus::Completed,
        };
        let transaction_id = TransactionId::generate();
        tracing::debug!(
            %order_id, %customer_id, %amount, %method,
            transaction_id = transaction_id.as_str(),
            "payment authorized"
        );
        self.authorizations.fetch_add(1, Ordering::SeqCst);

        Ok(PaymentAuthorization {
            status,
            transaction_id,
        })
    }
}
