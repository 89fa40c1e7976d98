//! Entitlement seam: decides whether paid content is unlocked.
//!
//! Commerce itself (catalog, purchase UI, receipts) lives outside this crate;
//! the library only needs a yes/no answer per product id and a typed surface
//! for reporting purchase results back to a front end.

use thiserror::Error;

/// Answers "is this product unlocked for the current user?".
///
/// A book without a product id is free and must always be unlocked; callers
/// enforce that rule before consulting the oracle.
pub trait EntitlementOracle {
    fn is_unlocked(&self, product_id: &str) -> bool;
}

/// Oracle that unlocks everything. Used for previews and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysUnlocked;

impl EntitlementOracle for AlwaysUnlocked {
    fn is_unlocked(&self, _product_id: &str) -> bool {
        true
    }
}

/// Result of a purchase attempt, reported to the caller as data.
///
/// None of these terminate anything: cancelled and pending simply leave the
/// book locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Success,
    Cancelled,
    Pending,
}

impl PurchaseOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, PurchaseOutcome::Success)
    }
}

/// Errors a purchase flow may report. Retryable by the caller.
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("purchase verification failed: {0}")]
    Verification(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_unlocked() {
        assert!(AlwaysUnlocked.is_unlocked("com.example.book.sealife"));
    }

    #[test]
    fn test_outcome_success() {
        assert!(PurchaseOutcome::Success.is_success());
        assert!(!PurchaseOutcome::Cancelled.is_success());
        assert!(!PurchaseOutcome::Pending.is_success());
    }
}
