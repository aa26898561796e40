//! Checkout orchestration and order lifecycle management.
//!
//! This crate turns a customer's cart into a durable order:
//! 1. Reserve stock in the inventory ledger
//! 2. Authorize payment
//! 3. Persist the order atomically
//!
//! If any step fails, previously granted reservations are released, so a
//! failed checkout leaves cart and inventory untouched. After creation,
//! orders move through their status lifecycle via [`OrderLifecycle`].

pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod orchestrator;

pub use error::CheckoutError;
pub use gateway::{InstantPaymentGateway, PaymentAuthorization, PaymentGateway};
pub use lifecycle::OrderLifecycle;
pub use orchestrator::{CheckoutOrchestrator, DEFAULT_STORE_TIMEOUT};
