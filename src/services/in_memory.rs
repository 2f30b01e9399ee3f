use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use crate::domain::basket::{
    Basket, BasketId, BasketValidation, ValidationError, ValidationResults, ValidationScope,
};
use crate::domain::checkout::ApiError;
use super::ValidationClient;

// ============================================================================
// In-Memory Basket Service
// ============================================================================
//
// Rule-based stand-in for the commerce backend:
// - Products: at least one line item; zero-quantity items are dropped (adjusted)
// - Addresses / InvoiceAddress / ShippingAddress: both addresses set
// - Shipping: shipping method selected
// - Payment: payment selected
// - All: every rule above
// An empty scope set means the server defaults (Products, Value).
//
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryBasketService {
    baskets: RwLock<HashMap<BasketId, Basket>>,
}

impl InMemoryBasketService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, basket: Basket) {
        let mut baskets = self.baskets.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        baskets.insert(basket.id.clone(), basket);
    }

    /// Simulate expiry on the server side
    pub fn remove(&self, basket_id: &BasketId) -> Option<Basket> {
        let mut baskets = self.baskets.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        baskets.remove(basket_id)
    }

    pub fn get(&self, basket_id: &BasketId) -> Option<Basket> {
        let baskets = self.baskets.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        baskets.get(basket_id).cloned()
    }
}

fn covers(scopes: &BTreeSet<ValidationScope>, wanted: &[ValidationScope]) -> bool {
    scopes.contains(&ValidationScope::All) || wanted.iter().any(|scope| scopes.contains(scope))
}

fn evaluate(basket: &mut Basket, scopes: &BTreeSet<ValidationScope>) -> ValidationResults {
    let defaults = BTreeSet::from([ValidationScope::Products, ValidationScope::Value]);
    let scopes = if scopes.is_empty() { &defaults } else { scopes };

    let mut errors = Vec::new();
    let mut adjusted = false;

    if covers(scopes, &[ValidationScope::Products]) {
        let before = basket.line_items.len();
        basket.line_items.retain(|item| item.quantity > 0);
        adjusted = basket.line_items.len() != before;

        if basket.line_items.is_empty() {
            errors.push(ValidationError::new(
                "basket.validation.empty.error",
                "The basket does not contain any products.",
                [ValidationScope::Products],
            ));
        }
    }

    let address_scopes = [
        ValidationScope::Addresses,
        ValidationScope::InvoiceAddress,
        ValidationScope::ShippingAddress,
    ];
    if covers(scopes, &address_scopes) {
        if basket.invoice_to_address.is_none() {
            errors.push(ValidationError::new(
                "basket.validation.invoice_address.missing.error",
                "An invoice address is required.",
                [ValidationScope::InvoiceAddress, ValidationScope::Addresses],
            ));
        }
        if basket.common_ship_to_address.is_none() {
            errors.push(ValidationError::new(
                "basket.validation.shipping_address.missing.error",
                "A shipping address is required.",
                [ValidationScope::ShippingAddress, ValidationScope::Addresses],
            ));
        }
    }

    if covers(scopes, &[ValidationScope::Shipping]) && basket.common_shipping_method.is_none() {
        errors.push(ValidationError::new(
            "basket.validation.shipping_method.missing.error",
            "Please select a shipping method.",
            [ValidationScope::Shipping],
        ));
    }

    if covers(scopes, &[ValidationScope::Payment]) && basket.payment.is_none() {
        errors.push(ValidationError::new(
            "basket.validation.payment.missing.error",
            "Please select a payment method.",
            [ValidationScope::Payment],
        ));
    }

    if errors.is_empty() {
        ValidationResults::valid(adjusted)
    } else {
        ValidationResults::invalid(adjusted, errors)
    }
}

#[async_trait]
impl ValidationClient for InMemoryBasketService {
    async fn validate(
        &self,
        basket_id: &BasketId,
        scopes: &BTreeSet<ValidationScope>,
    ) -> Result<BasketValidation, ApiError> {
        let mut baskets = self.baskets.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let basket = baskets.get_mut(basket_id).ok_or_else(|| {
            ApiError::basket_not_found(format!("Basket {basket_id} could not be found"))
        })?;

        let results = evaluate(basket, scopes);
        tracing::debug!(
            basket_id = %basket_id,
            valid = results.valid,
            adjusted = results.adjusted,
            errors = results.errors.len(),
            "Validated basket"
        );

        Ok(BasketValidation::new(basket.clone(), results))
    }
}
