use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::basket::{Basket, ValidationScope};

// ============================================================================
// Checkout Steps
// ============================================================================

/// Ordered checkout steps. `Receipt` stands for order creation and is never a
/// navigation target of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckoutStep {
    Addresses = 1,
    Shipping = 2,
    Payment = 3,
    Review = 4,
    Receipt = 5,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 5] = [
        CheckoutStep::Addresses,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
        CheckoutStep::Receipt,
    ];

    pub fn is_order_creation(self) -> bool {
        self == CheckoutStep::Receipt
    }

    /// Scopes to re-validate before entering this step
    pub fn validation_scopes(self) -> BTreeSet<ValidationScope> {
        let scopes: &[ValidationScope] = match self {
            CheckoutStep::Addresses => &[ValidationScope::Products, ValidationScope::Value],
            CheckoutStep::Shipping => &[
                ValidationScope::InvoiceAddress,
                ValidationScope::ShippingAddress,
                ValidationScope::Addresses,
            ],
            CheckoutStep::Payment => &[ValidationScope::Shipping],
            CheckoutStep::Review => &[ValidationScope::Payment],
            CheckoutStep::Receipt => &[ValidationScope::All],
        };
        scopes.iter().cloned().collect()
    }

    /// Whether a validation issue in `scope` is fixed on this step's page
    pub fn owns_issue_scope(self, scope: &ValidationScope) -> bool {
        matches!(
            (self, scope),
            (
                CheckoutStep::Addresses,
                ValidationScope::Addresses
                    | ValidationScope::InvoiceAddress
                    | ValidationScope::ShippingAddress
            ) | (CheckoutStep::Shipping, ValidationScope::Shipping)
                | (CheckoutStep::Payment, ValidationScope::Payment)
        )
    }

    /// Furthest step the basket already carries the data for
    pub fn furthest_reachable(basket: &Basket) -> CheckoutStep {
        if !basket.has_addresses() {
            CheckoutStep::Addresses
        } else if !basket.has_shipping_method() {
            CheckoutStep::Shipping
        } else if !basket.has_payment() {
            CheckoutStep::Payment
        } else {
            CheckoutStep::Review
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CheckoutStep::Addresses => "addresses",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
            CheckoutStep::Receipt => "receipt",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
