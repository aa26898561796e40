//! Shopping cart aggregate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::money::{Money, ProductId};
use crate::product::Product;

/// A single cart entry.
///
/// Echoes the catalog name and price captured at add-time. These values
/// are for display only; the checkout orchestrator re-reads authoritative
/// prices from the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Product name at add-time.
    pub name: String,

    /// Unit price at add-time.
    pub unit_price: Money,

    /// Quantity selected, always at least 1.
    pub quantity: u32,
}

/// A customer's in-progress selection of products and quantities.
///
/// Entries are keyed by product identity; adding the same product again
/// merges quantities. No stock check happens here — availability is
/// validated at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: HashMap<ProductId, CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product to the cart, merging with an existing entry.
    ///
    /// A quantity of zero is coerced to 1.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        self.items
            .entry(product.id.clone())
            .and_modify(|item| item.quantity += quantity)
            .or_insert_with(|| CartItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            });
    }

    /// Removes a product from the cart. No-op if absent.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.remove(product_id);
    }

    /// Overwrites the quantity for a product already in the cart.
    ///
    /// A quantity of zero removes the entry.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
        } else if let Some(item) = self.items.get_mut(product_id) {
            item.quantity = quantity;
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns true if the cart has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns all entries in the cart.
    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    /// Returns an entry by product ID.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.get(product_id)
    }

    /// Returns the display total, sum of `unit_price × quantity`.
    pub fn total(&self) -> Money {
        self.items
            .values()
            .map(|item| item.unit_price.multiply(item.quantity))
            .sum()
    }

    /// Returns the total quantity across all entries.
    pub fn count(&self) -> u32 {
        self.items.values().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::new("SKU-001", "Widget", Money::from_cents(1000), 10, "tools")
    }

    fn gadget() -> Product {
        Product::new("SKU-002", "Gadget", Money::from_cents(2500), 10, "tools")
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_add_merges_quantities() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2);
        cart.add(&widget(), 3);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::new("SKU-001")).unwrap().quantity, 5);
        assert_eq!(cart.total().cents(), 5000);
        assert_eq!(cart.count(), 5);
    }

    #[test]
    fn test_add_zero_quantity_coerces_to_one() {
        let mut cart = Cart::new();
        cart.add(&widget(), 0);
        assert_eq!(cart.get(&ProductId::new("SKU-001")).unwrap().quantity, 1);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2);
        cart.remove(&ProductId::new("SKU-001"));
        assert!(cart.is_empty());

        // removing again is a no-op
        cart.remove(&ProductId::new("SKU-001"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2);
        cart.set_quantity(&ProductId::new("SKU-001"), 7);
        assert_eq!(cart.get(&ProductId::new("SKU-001")).unwrap().quantity, 7);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2);
        cart.set_quantity(&ProductId::new("SKU-001"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.set_quantity(&ProductId::new("SKU-404"), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2);
        cart.add(&gadget(), 1);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_and_count_across_products() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2);
        cart.add(&gadget(), 1);

        assert_eq!(cart.total().cents(), 2 * 1000 + 2500);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2);

        let json = serde_json::to_string(&cart).unwrap();
        let deserialized: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(cart, deserialized);
    }
}
