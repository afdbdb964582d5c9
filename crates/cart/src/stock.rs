//! Pure stock ceiling validation.
//!
//! Consulted before any mutation that increases quantity. Never touches
//! state; the caller decides what the user sees.

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockReason {
    /// Nothing left in this size.
    OutOfStock,
    /// Some stock remains, but not enough for the request.
    ExceedsAvailable,
}

/// Outcome of a stock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecision {
    Allowed,
    Rejected {
        /// Largest quantity that could still be added on top of `existing`.
        allowed_max: u32,
        reason: StockReason,
    },
}

impl StockDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Validate a quantity increase against the per-size inventory ceiling.
///
/// `existing` is the quantity already in the cart for this `(product, size)`
/// key (zero for a fresh line). The request is rejected when
/// `existing + requested` exceeds `available`.
#[must_use]
pub fn validate(requested: u32, existing: u32, available: u32) -> StockDecision {
    let headroom = available.saturating_sub(existing);
    if requested <= headroom {
        StockDecision::Allowed
    } else {
        StockDecision::Rejected {
            allowed_max: headroom,
            reason: if headroom == 0 {
                StockReason::OutOfStock
            } else {
                StockReason::ExceedsAvailable
            },
        }
    }
}
