// ============================================================================
// Validation Services - The remote side of basket validation
// ============================================================================
//
// - `ValidationClient`: the seam the orchestrator calls through
// - `InMemoryBasketService`: rule-based backend for demos and integration tests
// - `ScriptedValidationClient`: canned outcomes with call recording
// - `ResilientValidationClient`: retry + circuit breaker around any client
//
// ============================================================================

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::basket::{BasketId, BasketValidation, ValidationScope};
use crate::domain::checkout::ApiError;

mod in_memory;
mod resilient;
mod scripted;

pub use in_memory::InMemoryBasketService;
pub use resilient::ResilientValidationClient;
pub use scripted::{ScriptedValidationClient, ValidationCall};

/// Re-evaluates a basket against the given scopes.
/// An empty scope set asks for the server's default scopes.
#[async_trait]
pub trait ValidationClient: Send + Sync {
    async fn validate(
        &self,
        basket_id: &BasketId,
        scopes: &BTreeSet<ValidationScope>,
    ) -> Result<BasketValidation, ApiError>;
}

#[async_trait]
impl<C: ValidationClient + ?Sized> ValidationClient for Arc<C> {
    async fn validate(
        &self,
        basket_id: &BasketId,
        scopes: &BTreeSet<ValidationScope>,
    ) -> Result<BasketValidation, ApiError> {
        (**self).validate(basket_id, scopes).await
    }
}
