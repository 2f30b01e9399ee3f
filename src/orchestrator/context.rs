use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::basket::{Basket, BasketValidation, ValidationScope};
use crate::domain::checkout::ApiError;
use crate::metrics::Metrics;
use crate::routing::RouteResolver;
use crate::services::ValidationClient;
use crate::state::StateContainer;

/// Collaborators every validating effect needs
pub struct ValidationContext {
    client: Arc<dyn ValidationClient>,
    state: Arc<dyn StateContainer>,
    resolver: RouteResolver,
    metrics: Arc<Metrics>,
}

impl ValidationContext {
    pub fn new(
        client: Arc<dyn ValidationClient>,
        state: Arc<dyn StateContainer>,
        resolver: RouteResolver,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            client,
            state,
            resolver,
            metrics,
        }
    }

    pub fn state(&self) -> &dyn StateContainer {
        self.state.as_ref()
    }

    pub fn resolver(&self) -> &RouteResolver {
        &self.resolver
    }

    pub fn current_basket(&self) -> Option<Basket> {
        self.state.current_basket()
    }

    /// Validate the current basket on behalf of `handler`.
    ///
    /// Without a current basket there is nothing to validate and the call
    /// fails as "basket not found".
    pub async fn validate(
        &self,
        handler: &'static str,
        scopes: &BTreeSet<ValidationScope>,
    ) -> Result<BasketValidation, ApiError> {
        let Some(basket) = self.state.current_basket() else {
            tracing::warn!(handler, "No current basket to validate");
            return Err(ApiError::basket_not_found("No basket available for checkout"));
        };

        self.metrics.record_validation_call(handler);
        let started = Instant::now();
        let result = self.client.validate(&basket.id, scopes).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(validation) if !validation.results.is_consistent() => {
                tracing::warn!(
                    handler,
                    basket_id = %basket.id,
                    errors = validation.results.errors.len(),
                    "Validation reported valid with errors; errors are ignored"
                );
                self.metrics.record_validation_result(handler, elapsed, Ok("valid_with_errors"));
            }
            Ok(validation) => {
                let outcome = if validation.results.valid { "valid" } else { "invalid" };
                tracing::debug!(
                    handler,
                    basket_id = %basket.id,
                    valid = validation.results.valid,
                    adjusted = validation.results.adjusted,
                    errors = validation.results.errors.len(),
                    "Basket validated"
                );
                self.metrics.record_validation_result(handler, elapsed, Ok(outcome));
            }
            Err(error) => {
                tracing::warn!(handler, basket_id = %basket.id, error = %error, "Basket validation failed");
                self.metrics.record_validation_result(handler, elapsed, Err(error.code_label()));
            }
        }

        result
    }
}
