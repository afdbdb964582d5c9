//! Core types for the FashionHub cart client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{Cart, CartLine, LineKey};
pub use id::*;
pub use product::{Accessory, Product};
