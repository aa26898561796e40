//! Persistence layer for the checkout core.
//!
//! Defines the three storage ports — [`CartStore`], [`InventoryStore`]
//! (the inventory ledger), and [`OrderStore`] — together with an
//! in-memory backend for tests and a PostgreSQL backend for production.
//! Stock reservation is an atomic conditional decrement in both backends.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryCartStore, InMemoryInventoryStore, InMemoryOrderStore};
pub use postgres::PostgresShopStore;
pub use store::{CartStore, InventoryStore, OrderStore, with_timeout};
