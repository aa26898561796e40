//! Data model for the checkout core.
//!
//! This crate provides the domain types shared by the storage and
//! orchestration layers:
//! - `Money` and `ProductId` value objects
//! - `Product` catalog entries with a non-negative stock counter
//! - `Cart` aggregate with additive quantity merging
//! - `Order`, `OrderLineItem` and `Payment` records with the order
//!   status state machine
//! - the domain error taxonomy

pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod product;
pub mod status;

pub use cart::{Cart, CartItem};
pub use error::DomainError;
pub use money::{DEFAULT_TAX_PERCENT, Money, ProductId};
pub use order::{Order, OrderLineItem};
pub use payment::{Payment, PaymentMethod, PaymentStatus, TransactionId};
pub use product::Product;
pub use status::OrderStatus;
