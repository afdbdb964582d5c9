//! FashionHub cart client.
//!
//! Client-authoritative shopping cart with two interchangeable backends:
//!
//! - [`backend::LocalCartBackend`] - durable file-backed storage in the
//!   local profile directory, used while no user is authenticated
//! - [`backend::RemoteCartBackend`] - the server-side cart, reached through
//!   the REST gateway, used once a user is authenticated
//!
//! The [`store::CartStore`] owns the in-memory cart view, validates
//! mutations against per-size stock ceilings, and reconciles the local cart
//! into the remote one exactly once per login. Mutation failures surface as
//! user notifications through the [`notify::Notifier`] seam; they never
//! propagate as errors past the store boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod session;
pub mod stock;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use gateway::{CartGateway, GatewayError};
pub use notify::{Notice, Notifier, Severity, TracingNotifier};
pub use session::{AccessToken, AuthState, Session};
pub use storage::{CartWatcher, LocalCartStore, StorageError};
pub use store::CartStore;
