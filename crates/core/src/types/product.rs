//! Product snapshot and accessory types.
//!
//! A [`Product`] here is the denormalized snapshot embedded in a cart line at
//! add time, not a live catalog record. It carries exactly the fields the
//! cart needs for validation and totals, and may go stale relative to the
//! catalog.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{AccessoryId, ProductId};

/// Denormalized product snapshot captured when an item is added to the cart.
///
/// Prices travel as JSON strings (decimal-as-string on the wire), matching
/// the backend's decimal column representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Sizes this product is offered in.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Remaining inventory per size.
    #[serde(default)]
    pub stock: HashMap<String, u32>,
}

impl Product {
    /// Whether the product is offered in the given size.
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Inventory ceiling for a size. Unknown sizes have zero stock.
    #[must_use]
    pub fn stock_for(&self, size: &str) -> u32 {
        self.stock.get(size).copied().unwrap_or(0)
    }
}

/// An add-on sold alongside a cart line (e.g., a belt with a pair of jeans).
///
/// Accessories are correlated 1:1 with their parent line: an accessory's
/// price multiplies by the parent line quantity, it is never quantified
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessory {
    pub id: AccessoryId,
    pub name: String,
    pub price: Decimal,
}
