//! Cart line items and the session cart collection.
//!
//! A cart is an ordered collection of [`CartLine`] values keyed by
//! `(product, size)`. Two lines never share a key: adding a duplicate key
//! merges by summing quantities, never by appending a second line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::{Accessory, Product};

/// One product+size+quantity entry in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    /// Product snapshot captured at add time.
    pub product: Product,
    pub size: String,
    pub quantity: u32,
    #[serde(default)]
    pub accessories: Vec<Accessory>,
}

impl CartLine {
    /// The uniqueness key for this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            size: self.size.clone(),
        }
    }

    /// Line total: item price times quantity, plus each accessory price
    /// times the same quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        let accessories: Decimal = self.accessories.iter().map(|a| a.price).sum();
        (self.product.price + accessories) * Decimal::from(self.quantity)
    }
}

/// Cart line uniqueness key: `(productId, size)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
}

impl LineKey {
    /// Create a key from its parts.
    #[must_use]
    pub const fn new(product_id: ProductId, size: String) -> Self {
        Self { product_id, size }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.product_id, self.size)
    }
}

/// Ordered collection of cart lines for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from existing lines, merging any duplicate keys.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.merge(line);
        }
        cart
    }

    /// Borrow the lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Find the line with the given key, if present.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.key() == key)
    }

    /// Insert a line, summing quantities and concatenating accessories when
    /// a line with the same key already exists.
    pub fn merge(&mut self, line: CartLine) {
        let key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.key() == key) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            existing.accessories.extend(line.accessories);
        } else {
            self.lines.push(line);
        }
    }

    /// Set the quantity for a key. Returns `false` when the key is absent.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> bool {
        match self.lines.iter_mut().find(|l| &l.key() == key) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line with the given key. Returns `false` when absent.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key() != key);
        self.lines.len() != before
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |sum, l| sum.saturating_add(l.quantity))
    }

    /// Sum of line totals across all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Consume the cart, yielding its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::id::AccessoryId;

    fn product(id: i64, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: price.parse().expect("decimal"),
            sizes: vec!["S".to_string(), "M".to_string()],
            stock: HashMap::from([("M".to_string(), 10), ("S".to_string(), 10)]),
        }
    }

    fn line(id: i64, size: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            product: product(id, "20.00"),
            size: size.to_string(),
            quantity,
            accessories: Vec::new(),
        }
    }

    #[test]
    fn test_merge_sums_duplicate_keys() {
        let mut cart = Cart::new();
        cart.merge(line(1, "M", 1));
        cart.merge(line(1, "M", 1));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_merge_keeps_distinct_sizes_separate() {
        let mut cart = Cart::new();
        cart.merge(line(1, "M", 1));
        cart.merge(line(1, "S", 2));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_from_lines_merges_duplicates() {
        let cart = Cart::from_lines(vec![line(1, "M", 2), line(2, "S", 1), line(1, "M", 3)]);
        assert_eq!(cart.len(), 2);
        assert_eq!(
            cart.get(&LineKey::new(ProductId::new(1), "M".to_string()))
                .map(|l| l.quantity),
            Some(5)
        );
    }

    #[test]
    fn test_remove_and_set_quantity() {
        let mut cart = Cart::from_lines(vec![line(1, "M", 2), line(2, "S", 1)]);
        let key = LineKey::new(ProductId::new(1), "M".to_string());
        assert!(cart.set_quantity(&key, 7));
        assert_eq!(cart.get(&key).map(|l| l.quantity), Some(7));
        assert!(cart.remove(&key));
        assert!(!cart.remove(&key));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_line_total_multiplies_accessories_by_quantity() {
        let mut item = line(1, "M", 3);
        item.accessories.push(Accessory {
            id: AccessoryId::new(9),
            name: "Belt".to_string(),
            price: "5.50".parse().expect("decimal"),
        });
        // (20.00 + 5.50) * 3
        assert_eq!(item.line_total(), "76.50".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn test_total_price_sums_lines() {
        let mut cart = Cart::new();
        cart.merge(line(1, "M", 2)); // 40.00
        cart.merge(line(2, "S", 1)); // 20.00
        assert_eq!(
            cart.total_price(),
            "60.00".parse::<Decimal>().expect("decimal")
        );
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let json = serde_json::to_value(line(5, "M", 2)).expect("serialize");
        assert!(json.get("productId").is_some());
        assert_eq!(json["product"]["id"], serde_json::json!(5));
        assert_eq!(json["quantity"], serde_json::json!(2));
    }
}
