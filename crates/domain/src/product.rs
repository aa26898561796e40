//! Catalog products.

use serde::{Deserialize, Serialize};

use crate::money::{Money, ProductId};

/// A catalog product with its live stock counter.
///
/// `stock` is unsigned, so the `stock >= 0` invariant is enforced by the
/// type. The counter is mutated only by the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product identifier (SKU).
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Current unit price.
    pub price: Money,

    /// Units available for reservation.
    pub stock: u32,

    /// Catalog category.
    pub category: String,
}

impl Product {
    /// Creates a new product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        stock: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            category: category.into(),
        }
    }
}
