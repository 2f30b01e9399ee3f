use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::basket::{BasketId, BasketValidation, ValidationScope};
use crate::domain::checkout::ApiError;
use crate::utils::{
    retry_on_transient, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryPolicy,
};
use super::ValidationClient;

pub const CIRCUIT_OPEN_CODE: &str = "validation.circuit_open.error";

/// Retries transient failures and stops calling a backend that keeps failing.
///
/// One exhausted retry sequence counts as one breaker failure. Business
/// failures such as "basket not found" never open the circuit.
pub struct ResilientValidationClient<C> {
    inner: C,
    policy: RetryPolicy,
    breaker: CircuitBreaker,
}

impl<C: ValidationClient> ResilientValidationClient<C> {
    pub fn new(inner: C, policy: RetryPolicy, breaker: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            policy,
            breaker: CircuitBreaker::new(breaker),
        }
    }

    pub fn with_defaults(inner: C) -> Self {
        Self::new(inner, RetryPolicy::default(), CircuitBreakerConfig::default())
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<C: ValidationClient> ValidationClient for ResilientValidationClient<C> {
    async fn validate(
        &self,
        basket_id: &BasketId,
        scopes: &BTreeSet<ValidationScope>,
    ) -> Result<BasketValidation, ApiError> {
        let attempts = retry_on_transient(&self.policy, |attempt| {
            tracing::trace!(basket_id = %basket_id, attempt, "Validation attempt");
            self.inner.validate(basket_id, scopes)
        });

        match self.breaker.call_counting(attempts, ApiError::is_transient).await {
            Ok(validation) => Ok(validation),
            Err(CircuitBreakerError::OperationFailed(error)) => Err(error),
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!(basket_id = %basket_id, "Validation rejected, circuit open");
                Err(ApiError::new(503, "Basket validation temporarily unavailable")
                    .with_code(CIRCUIT_OPEN_CODE))
            }
        }
    }
}
