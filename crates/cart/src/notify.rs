//! User-facing notification seam.
//!
//! The cart store never lets a failed mutation escape as an error. Instead
//! every outcome the user should see is reported as a [`Notice`] through an
//! injected [`Notifier`]. A UI would render these as toasts; the default
//! [`TracingNotifier`] writes them to the log.

use std::fmt;

/// Notice severity, mirroring toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A user-visible cart event. One variant per outcome class so callers and
/// tests can match on the class rather than on message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Item added (or merged) successfully.
    Added { product: String },
    /// Quantity was zero or negative input reached the store.
    InvalidQuantity,
    /// Product has no sizes, or the requested size is not offered.
    SizeUnavailable { size: String },
    /// Fresh add would exceed the per-size stock ceiling.
    InsufficientStock { size: String, available: u32 },
    /// Merging into an existing line would exceed the stock ceiling.
    StockCeilingReached { size: String, available: u32 },
    /// Remote or local cart could not be loaded.
    LoadFailed,
    /// Add reached the backend but failed there.
    AddFailed,
    /// Remove reached the backend but failed there.
    RemoveFailed,
    /// Quantity update reached the backend but failed there.
    UpdateFailed,
    /// Clear reached the backend but failed there.
    ClearFailed,
}

impl Notice {
    /// Severity for rendering.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Added { .. } => Severity::Success,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { product } => write!(f, "Added {product} to cart"),
            Self::InvalidQuantity => write!(f, "Quantity must be at least 1"),
            Self::SizeUnavailable { size } => {
                write!(f, "Size {size} is not available for this product")
            }
            Self::InsufficientStock { size, available } => {
                write!(f, "Only {available} available in size {size}")
            }
            Self::StockCeilingReached { size, available } => {
                write!(f, "Cannot add more. Only {available} available in size {size}")
            }
            Self::LoadFailed => write!(f, "Failed to load cart"),
            Self::AddFailed => write!(f, "Failed to add item to cart"),
            Self::RemoveFailed => write!(f, "Failed to remove item from cart"),
            Self::UpdateFailed => write!(f, "Failed to update quantity"),
            Self::ClearFailed => write!(f, "Failed to clear cart"),
        }
    }
}

/// Sink for user-visible cart events.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity() {
            Severity::Success => tracing::info!(%notice, "cart"),
            Severity::Error => tracing::warn!(%notice, "cart"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_constraint() {
        let notice = Notice::InsufficientStock {
            size: "M".to_string(),
            available: 1,
        };
        assert_eq!(notice.to_string(), "Only 1 available in size M");
        assert_eq!(notice.severity(), Severity::Error);

        let notice = Notice::Added {
            product: "Denim Jacket".to_string(),
        };
        assert_eq!(notice.to_string(), "Added Denim Jacket to cart");
        assert_eq!(notice.severity(), Severity::Success);
    }
}
