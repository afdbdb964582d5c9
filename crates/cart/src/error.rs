//! Unified error type for cart backend operations.
//!
//! Layer-specific errors live next to their layer (`GatewayError` in
//! [`crate::gateway`], `StorageError` in [`crate::storage`]); this type is
//! what the backend strategy trait returns so the store can classify
//! failures uniformly.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::storage::StorageError;

/// Error from a cart backend operation.
#[derive(Debug, Error)]
pub enum CartError {
    /// Remote cart call failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Local persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Whether this failure means the bearer token was rejected and the
    /// store should fall back to local-cart mode.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::Unauthorized))
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, CartError>;
