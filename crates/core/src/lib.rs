//! FashionHub Core - Shared types library.
//!
//! This crate provides common types used across the FashionHub cart client
//! components:
//! - `cart` - Cart store, backends, and reconciliation
//! - `cli` - Terminal client for driving a cart against a backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no file
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, product snapshots, and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
