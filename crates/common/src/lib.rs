//! Shared types used across the checkout core crates.

pub mod types;

pub use types::{CustomerId, OrderId};
